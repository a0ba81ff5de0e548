//! Document reader: the main entry point for decoding an Inventor file.
//!
//! # Usage
//!
//! ```rust,ignore
//! use invrust::io::reader::InventorReader;
//!
//! let model = InventorReader::from_directory("extracted/Part1.ipt")?.read()?;
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;

use crate::error::{InvError, Result};
use crate::graph::GraphRoot;
use crate::io::property_set::{
    read_document_summary_information, read_summary_information, DOCUMENT_SUMMARY_INFORMATION,
    SUMMARY_INFORMATION,
};
use crate::io::rse::{self, KNOWN_DIRECTORY_VERSIONS, PARTIAL_DIRECTORY_VERSION};
use crate::io::segment::SegmentDecoder;
use crate::io::storage::{CompoundStorage, DirectoryStorage, StreamPath};
use crate::model::document::{DecodedModel, EmbeddedResource, SegmentOutcome};
use crate::notification::{Notification, NotificationCollection, NotificationType};

/// Storage holding the segment streams and the `RSe*` headers.
pub const RSE_STORAGE: &str = "RSeStorage";

/// Directory layout assumed when `RSeDb` is absent.
const DEFAULT_DIRECTORY_VERSION: u32 = 0x1F;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration options for the document reader.
#[derive(Debug, Clone)]
pub struct InventorReaderConfiguration {
    /// When `true`, a record that runs past its payload only fails that
    /// record instead of the whole segment.
    ///
    /// Default: `false`.
    pub failsafe: bool,

    /// When `true`, binding an attribute name twice on one node is an
    /// error rather than a warning.
    pub strict_attributes: bool,

    /// Decode segments on the rayon thread pool.
    pub parallel: bool,

    /// Build the per-segment graphs after resolution.
    ///
    /// Default: `true`.
    pub build_graph: bool,

    /// Checked between segments; once set the read returns
    /// [`InvError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for InventorReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: false,
            strict_attributes: false,
            parallel: false,
            build_graph: true,
            cancel: None,
        }
    }
}

impl InventorReaderConfiguration {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

// ---------------------------------------------------------------------------
// Segment jobs
// ---------------------------------------------------------------------------

/// Contents of one `M`/`B` stream pair.
enum SegmentStreams {
    Open { meta: Vec<u8>, data: Vec<u8> },
    /// A stream of the pair could not be read; `stream` names it.
    Unreadable { stream: StreamPath, error: InvError },
}

/// One `M`/`B` stream pair, opened ahead of decoding.
struct SegmentJob {
    meta_path: StreamPath,
    streams: SegmentStreams,
}

/// Result of one job: the segment name it decoded under, its outcome and
/// the notifications it raised.
type JobResult = (String, SegmentOutcome, NotificationCollection);

/// Whether `name` is `prefix` followed by a hexadecimal segment number.
fn is_segment_stream(name: &str, prefix: char) -> bool {
    let mut chars = name.chars();
    chars.next() == Some(prefix)
        && name.len() > 1
        && chars.all(|c| c.is_ascii_hexdigit())
}

impl SegmentJob {
    fn run(self, config: &InventorReaderConfiguration) -> Result<JobResult> {
        if config.cancelled() {
            return Err(InvError::Cancelled);
        }
        let stream = self.meta_path.to_string();
        let mut notifications = NotificationCollection::new();

        let (meta, data) = match self.streams {
            SegmentStreams::Open { meta, data } => (meta, data),
            SegmentStreams::Unreadable {
                stream: unreadable,
                error,
            } => {
                notifications.push(
                    Notification::from_error(NotificationType::Error, &error)
                        .with_stream(unreadable.to_string()),
                );
                return Ok((stream.clone(), SegmentOutcome::Failed { stream, error }, notifications));
            }
        };

        let decoder = SegmentDecoder::new(config);
        match decoder.decode(&stream, &meta, &data, &mut notifications) {
            Ok(table) => Ok((table.name().to_string(), SegmentOutcome::Decoded(table), notifications)),
            Err(InvError::Cancelled) => Err(InvError::Cancelled),
            Err(error) => {
                notifications.push(
                    Notification::from_error(NotificationType::Error, &error).with_stream(stream.as_str()),
                );
                Ok((stream.clone(), SegmentOutcome::Failed { stream, error }, notifications))
            }
        }
    }
}

/// `B<hex>` twin of an `M<hex>` stream.
fn binary_name(meta: &StreamPath) -> String {
    format!("B{}", &meta.name()[1..])
}

// ---------------------------------------------------------------------------
// InventorReader
// ---------------------------------------------------------------------------

/// Inventor document reader over a compound storage.
///
/// # Architecture
///
/// The read pipeline is:
///
/// 1. Read the property sets into [`DocumentInfo`](crate::model::DocumentInfo).
/// 2. Read the fixed-layout streams: `UFRxDoc`, `Protein`, `RSeDb`,
///    `RSeSegInfo`, `RSeDbRevisionInfo`.
/// 3. Open every `M<hex>` / `B<hex>` pair.
/// 4. Decode each pair with [`SegmentDecoder`], in sequence or on the
///    rayon pool.
/// 5. Order outcomes by directory position and collect the graphs.
pub struct InventorReader<S: CompoundStorage> {
    storage: S,
    config: InventorReaderConfiguration,
    notifications: NotificationCollection,
}

impl InventorReader<DirectoryStorage> {
    /// Open a compound document extracted to a directory tree.
    pub fn from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DirectoryStorage::open(path)?))
    }
}

impl<S: CompoundStorage> InventorReader<S> {
    /// Create a reader over any compound storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: InventorReaderConfiguration::default(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Set configuration options.
    pub fn with_config(mut self, config: InventorReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the whole document.
    pub fn read(mut self) -> Result<DecodedModel> {
        let paths = self.storage.stream_paths();
        let mut model = DecodedModel::default();

        self.read_metadata(&paths, &mut model);
        self.read_headers(&paths, &mut model);

        let jobs = self.open_segments(&paths);
        tracing::info!(segments = jobs.len(), parallel = self.config.parallel, "reading document");

        let results: Vec<JobResult> = if self.config.parallel {
            let config = &self.config;
            jobs.into_par_iter()
                .map(|job| job.run(config))
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut results = Vec::with_capacity(jobs.len());
            for job in jobs {
                results.push(job.run(&self.config)?);
            }
            results
        };

        let mut ordered: Vec<(usize, JobResult)> = results
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let rank = model
                    .segment_directory
                    .position(&result.0)
                    .unwrap_or(model.segment_directory.entries.len() + i);
                (rank, result)
            })
            .collect();
        ordered.sort_by_key(|(rank, _)| *rank);

        for (_, (name, mut outcome, notifications)) in ordered {
            self.notifications.append(notifications);
            if let SegmentOutcome::Decoded(table) = &mut outcome {
                table.segment_info = model.segment_directory.find(&name).cloned();
            }
            let key = if model.segments.contains_key(&name) {
                let stream = match &outcome {
                    SegmentOutcome::Decoded(table) => table.stream.clone(),
                    SegmentOutcome::Failed { stream, .. } => stream.clone(),
                };
                format!("{name} ({stream})")
            } else {
                name
            };
            model.segments.insert(key, outcome);
        }

        model.graph = collect_graphs(&model.segments);
        model.notifications = self.notifications;
        tracing::info!(
            segments = model.segments.len(),
            failed = model.failed_segments().len(),
            "document read"
        );
        Ok(model)
    }

    fn warn(&mut self, stream: &StreamPath, error: &InvError) {
        self.notifications.push(
            Notification::from_error(NotificationType::Warning, error).with_stream(stream.to_string()),
        );
    }

    /// Property sets, fingerprint and embedded resources.
    fn read_metadata(&mut self, paths: &[StreamPath], model: &mut DecodedModel) {
        for path in paths {
            let name = path.name();
            let result = if path.root() == "CacheGraphics" {
                continue;
            } else if name == SUMMARY_INFORMATION {
                self.storage
                    .open_stream(path)
                    .and_then(|data| read_summary_information(&data, &mut model.info))
            } else if name == DOCUMENT_SUMMARY_INFORMATION {
                self.storage
                    .open_stream(path)
                    .and_then(|data| read_document_summary_information(&data, &mut model.info))
            } else if name == "UFRxDoc" {
                self.storage
                    .open_stream(path)
                    .and_then(|data| rse::read_fingerprint(&data))
                    .map(|fp| model.fingerprint = Some(fp))
            } else if name == "Protein" {
                self.storage
                    .open_stream(path)
                    .and_then(|data| rse::read_protein(&data))
                    .map(|data| {
                        model.embedded.push(EmbeddedResource {
                            stream: path.to_string(),
                            data,
                        })
                    })
            } else {
                continue;
            };
            if let Err(error) = result {
                self.warn(path, &error);
            }
        }
    }

    /// `RSeDb`, `RSeSegInfo` and `RSeDbRevisionInfo`.
    fn read_headers(&mut self, paths: &[StreamPath], model: &mut DecodedModel) {
        let rse_stream = |name: &str| {
            paths
                .iter()
                .find(|p| p.root() == RSE_STORAGE && p.name() == name)
                .cloned()
        };

        if let Some(path) = rse_stream("RSeDb") {
            match self
                .storage
                .open_stream(&path)
                .and_then(|data| rse::read_database_header(&data))
            {
                Ok(header) => model.database = Some(header),
                Err(error) => self.warn(&path, &error),
            }
        }

        let version = model
            .database
            .as_ref()
            .map_or(DEFAULT_DIRECTORY_VERSION, |db| db.version);
        if let Some(path) = rse_stream("RSeSegInfo") {
            match self
                .storage
                .open_stream(&path)
                .and_then(|data| rse::read_segment_directory(&data, version))
            {
                Ok(directory) => {
                    if version == PARTIAL_DIRECTORY_VERSION {
                        self.notifications.push(
                            Notification {
                                kind: Some("UnknownRecordType"),
                                ..Notification::new(
                                    NotificationType::NotImplemented,
                                    format!("segment directory {version:#X}: per-entry block kept raw"),
                                )
                            }
                            .with_stream(path.to_string()),
                        );
                    } else if !KNOWN_DIRECTORY_VERSIONS.contains(&version) {
                        self.notifications.push(
                            Notification::new(
                                NotificationType::Warning,
                                format!("segment directory {version:#X} read with the nearest known layout"),
                            )
                            .with_stream(path.to_string()),
                        );
                    }
                    model.segment_directory = directory;
                }
                Err(error) => self.warn(&path, &error),
            }
        }

        if let Some(path) = rse_stream("RSeDbRevisionInfo") {
            match self
                .storage
                .open_stream(&path)
                .and_then(|data| rse::read_revision_info(&data))
            {
                Ok(revisions) => model.revisions = revisions,
                Err(error) => self.warn(&path, &error),
            }
        }
    }

    /// Open every `M<hex>` stream and its `B<hex>` twin. A pair that
    /// cannot be read becomes a job that fails only its own segment.
    fn open_segments(&self, paths: &[StreamPath]) -> Vec<SegmentJob> {
        paths
            .iter()
            .filter(|p| p.root() == RSE_STORAGE && is_segment_stream(p.name(), 'M'))
            .map(|path| SegmentJob {
                meta_path: path.clone(),
                streams: self.open_pair(path),
            })
            .collect()
    }

    fn open_pair(&self, meta_path: &StreamPath) -> SegmentStreams {
        let twin = meta_path.sibling(binary_name(meta_path));
        let meta = match self.storage.open_stream(meta_path) {
            Ok(meta) => meta,
            Err(error) => {
                return SegmentStreams::Unreadable {
                    stream: meta_path.clone(),
                    error,
                }
            }
        };
        if !self.storage.contains(&twin) {
            return SegmentStreams::Unreadable {
                stream: twin,
                error: InvError::TruncatedInput {
                    offset: 0,
                    needed: 1,
                    available: 0,
                },
            };
        }
        match self.storage.open_stream(&twin) {
            Ok(data) => SegmentStreams::Open { meta, data },
            Err(error) => SegmentStreams::Unreadable { stream: twin, error },
        }
    }
}

/// Gather the segment graphs under their segment names.
fn collect_graphs(segments: &IndexMap<String, SegmentOutcome>) -> GraphRoot {
    let mut root = GraphRoot::new();
    for (name, outcome) in segments {
        if let Some(graph) = outcome.table().and_then(|t| t.graph.as_ref()) {
            root.insert(name.as_str(), graph.clone());
        }
    }
    root
}
