//! In-memory model produced by the decoder.
//!
//! Nodes live in a per-segment arena ([`SegmentNodeTable`]); every edge
//! between nodes is a [`NodeRef`] carrying an index, never a pointer.

pub mod document;
pub mod node;
pub mod node_ref;
pub mod segment;
pub mod value;

pub use document::{
    DatabaseHeader, DecodedModel, DocumentInfo, EmbeddedResource, Fingerprint, RevisionEntry,
    SegmentDirectory, SegmentInfoEntry, SegmentOutcome,
};
pub use node::{AttributeMap, Node, NodeFlags};
pub use node_ref::{NodeRef, RefKind, RefTarget};
pub use segment::{RadiusBinding, SegmentNodeTable};
pub use value::{
    FontInfo, ListShape, ListValue, MapKey, MapValue, NumericArray, TextEncoding, Value,
};
