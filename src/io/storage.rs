//! Compound-document access.
//!
//! The decoder does not parse the OLE container itself. It needs a storage
//! that lists stream paths and opens streams as byte buffers; two such
//! storages are provided: an in-memory one and one over a directory tree
//! holding an extracted compound document.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{InvError, Result};

/// Path of a stream inside a compound document, one name per storage level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamPath(Vec<String>);

impl StreamPath {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(components.into_iter().map(Into::into).collect())
    }

    /// Parse a `/`-separated path.
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|c| !c.is_empty()))
    }

    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Last component.
    pub fn name(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }

    /// First component, the top-level storage or stream.
    pub fn root(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or("")
    }

    /// Same path with the last component replaced.
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        let mut components = self.0.clone();
        if let Some(last) = components.last_mut() {
            *last = name.into();
        }
        Self(components)
    }
}

impl fmt::Display for StreamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for StreamPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Read access to the streams of a compound document.
pub trait CompoundStorage: Sync {
    /// Every stream path, in directory order.
    fn stream_paths(&self) -> Vec<StreamPath>;

    /// Read a whole stream.
    fn open_stream(&self, path: &StreamPath) -> Result<Vec<u8>>;

    fn contains(&self, path: &StreamPath) -> bool {
        self.stream_paths().iter().any(|p| p == path)
    }
}

/// Streams held in memory, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    streams: IndexMap<StreamPath, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<StreamPath>, data: Vec<u8>) {
        self.streams.insert(path.into(), data);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_stream(mut self, path: impl Into<StreamPath>, data: Vec<u8>) -> Self {
        self.insert(path, data);
        self
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl CompoundStorage for MemoryStorage {
    fn stream_paths(&self) -> Vec<StreamPath> {
        self.streams.keys().cloned().collect()
    }

    fn open_stream(&self, path: &StreamPath) -> Result<Vec<u8>> {
        self.streams
            .get(path)
            .cloned()
            .ok_or_else(|| InvError::MissingStream(path.to_string()))
    }

    fn contains(&self, path: &StreamPath) -> bool {
        self.streams.contains_key(path)
    }
}

/// A compound document extracted to a directory tree: storages are
/// directories, streams are files.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
    paths: Vec<StreamPath>,
}

impl DirectoryStorage {
    /// Index every file below `root`. Entries are sorted by name at each
    /// level.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut paths = Vec::new();
        let mut pending = vec![(root.clone(), Vec::<String>::new())];
        while let Some((dir, prefix)) = pending.pop() {
            let mut entries = fs::read_dir(&dir)?.collect::<std::io::Result<Vec<_>>>()?;
            entries.sort_by_key(|e| e.file_name());
            let mut subdirs = Vec::new();
            for entry in entries {
                let name = entry.file_name().to_string_lossy().into_owned();
                let mut components = prefix.clone();
                components.push(name);
                if entry.file_type()?.is_dir() {
                    subdirs.push((entry.path(), components));
                } else {
                    paths.push(StreamPath(components));
                }
            }
            pending.extend(subdirs.into_iter().rev());
        }
        paths.sort();
        Ok(Self { root, paths })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CompoundStorage for DirectoryStorage {
    fn stream_paths(&self) -> Vec<StreamPath> {
        self.paths.clone()
    }

    fn open_stream(&self, path: &StreamPath) -> Result<Vec<u8>> {
        if !self.paths.contains(path) {
            return Err(InvError::MissingStream(path.to_string()));
        }
        let mut file = self.root.clone();
        for component in path.components() {
            file.push(component);
        }
        Ok(fs::read(file)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_path() {
        let path = StreamPath::parse("RSeStorage/M4A3F");
        assert_eq!(path.root(), "RSeStorage");
        assert_eq!(path.name(), "M4A3F");
        assert_eq!(path.sibling("B4A3F").to_string(), "RSeStorage/B4A3F");
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new()
            .with_stream("UFRxDoc", vec![1, 2])
            .with_stream("RSeStorage/RSeDb", vec![3]);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.stream_paths()[1].to_string(), "RSeStorage/RSeDb");
        assert_eq!(storage.open_stream(&"UFRxDoc".into()).unwrap(), vec![1, 2]);
        assert!(matches!(
            storage.open_stream(&"Protein".into()),
            Err(InvError::MissingStream(_))
        ));
    }

    #[test]
    fn test_directory_storage() {
        let root = std::env::temp_dir().join(format!("invrust-storage-{}", std::process::id()));
        fs::create_dir_all(root.join("RSeStorage")).unwrap();
        fs::write(root.join("RSeStorage").join("M1"), [7u8]).unwrap();
        fs::write(root.join("UFRxDoc"), [8u8]).unwrap();

        let storage = DirectoryStorage::open(&root).unwrap();
        let paths: Vec<String> = storage.stream_paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, vec!["RSeStorage/M1", "UFRxDoc"]);
        assert_eq!(storage.open_stream(&"RSeStorage/M1".into()).unwrap(), vec![7]);

        fs::remove_dir_all(&root).unwrap();
    }
}
