//! Document-level container and the metadata records read beside the segments.

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::error::InvError;
use crate::graph::GraphRoot;
use crate::model::segment::SegmentNodeTable;
use crate::notification::NotificationCollection;
use crate::types::Uuid;

/// Summary metadata for a document.
///
/// Filled from the `\x05SummaryInformation` and
/// `\x05DocumentSummaryInformation` property sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    /// Title of the document.
    pub title: String,
    /// A short description or subject for the document.
    pub subject: String,
    /// Name of the person who created the document.
    pub author: String,
    /// Keywords to help categorize the document.
    pub keywords: String,
    /// Notes or comments about the document.
    pub comments: String,
    /// Name of the last person who saved the document.
    pub last_modified_by: String,
    /// Application that created the document.
    pub created_by: String,
    /// Company owning the document.
    pub company: String,
    /// When the document was first created.
    pub created: Option<OffsetDateTime>,
    /// When the document was last saved.
    pub modified: Option<OffsetDateTime>,
    /// Remaining string properties, keyed by property name.
    pub properties: IndexMap<String, String>,
}

/// Database header from `RSeStorage/RSeDb`.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseHeader {
    /// Schema identifier.
    pub schema: Uuid,
    /// Database format version; selects the `RSeSegInfo` layout.
    pub version: u32,
    /// Creation time.
    pub created: Option<OffsetDateTime>,
    /// Last modification time.
    pub modified: Option<OffsetDateTime>,
    /// Document identifier.
    pub document: Uuid,
}

/// One entry of the segment directory (`RSeStorage/RSeSegInfo`).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentInfoEntry {
    /// Segment name.
    pub name: String,
    /// Segment identifier.
    pub id: Uuid,
    /// Segment type identifier (directory version `0x15` and later).
    pub type_id: Option<Uuid>,
    /// Segment flags (directory version `0x1A` and later).
    pub flags: Option<u32>,
    /// Segment revision (directory version `0x1F` and later).
    pub revision: Option<u32>,
    /// Per-entry block whose layout is not decoded (directory version `0x1D`).
    pub raw: Option<Vec<u8>>,
}

/// The segment directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentDirectory {
    /// Directory layout version (taken from the database header).
    pub version: u32,
    /// Entries in directory order.
    pub entries: Vec<SegmentInfoEntry>,
}

impl SegmentDirectory {
    /// Directory entry for a segment name.
    pub fn find(&self, name: &str) -> Option<&SegmentInfoEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Position of a segment name in directory order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

/// One entry of `RSeStorage/RSeDbRevisionInfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionEntry {
    pub id: Uuid,
    pub number: u32,
    pub flags: u32,
}

/// Version fingerprint from the `UFRxDoc` stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Fingerprint {
    pub schema: u32,
    pub release: u32,
    pub saved: Option<OffsetDateTime>,
    pub application: String,
}

/// An embedded file resource (`Protein` stream).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    /// Stream path the resource was extracted from.
    pub stream: String,
    /// Raw resource bytes.
    pub data: Vec<u8>,
}

/// Result of decoding one segment.
#[derive(Debug)]
pub enum SegmentOutcome {
    /// The segment decoded; individual records may still carry errors.
    Decoded(SegmentNodeTable),
    /// The segment was abandoned.
    Failed {
        /// Metadata stream path.
        stream: String,
        /// Error that ended the segment.
        error: InvError,
    },
}

impl SegmentOutcome {
    pub fn table(&self) -> Option<&SegmentNodeTable> {
        match self {
            SegmentOutcome::Decoded(table) => Some(table),
            SegmentOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&InvError> {
        match self {
            SegmentOutcome::Decoded(_) => None,
            SegmentOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SegmentOutcome::Failed { .. })
    }
}

/// A decoded Inventor document.
#[derive(Debug, Default)]
pub struct DecodedModel {
    /// Summary metadata.
    pub info: DocumentInfo,
    /// `RSeDb` header, when present.
    pub database: Option<DatabaseHeader>,
    /// Segment directory.
    pub segment_directory: SegmentDirectory,
    /// Revision map.
    pub revisions: Vec<RevisionEntry>,
    /// `UFRxDoc` fingerprint, when present.
    pub fingerprint: Option<Fingerprint>,
    /// Embedded file resources.
    pub embedded: Vec<EmbeddedResource>,
    /// Segment name → outcome, in directory order.
    pub segments: IndexMap<String, SegmentOutcome>,
    /// Combined tree of every decoded segment.
    pub graph: GraphRoot,
    /// Every warning and error recorded during the read.
    pub notifications: NotificationCollection,
}

impl DecodedModel {
    /// Whether every segment decoded.
    pub fn imported_successfully(&self) -> bool {
        !self.segments.values().any(SegmentOutcome::is_failed)
    }

    /// Decoded table for a segment name.
    pub fn segment(&self, name: &str) -> Option<&SegmentNodeTable> {
        self.segments.get(name).and_then(SegmentOutcome::table)
    }

    /// Decoded tables in directory order.
    pub fn tables(&self) -> impl Iterator<Item = &SegmentNodeTable> {
        self.segments.values().filter_map(SegmentOutcome::table)
    }

    /// Names of the segments that failed.
    pub fn failed_segments(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
