//! Error types for invrust library

use std::io;
use thiserror::Error;

use crate::types::{TypeId, Uuid};

/// Main error type for invrust operations
#[derive(Debug, Error)]
pub enum InvError {
    /// IO error occurred while opening a stream
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A primitive read ran past the end of its buffer
    #[error("Truncated input at offset {offset:#X}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Local type tag is outside the segment's type table
    #[error("Unknown type tag {tag:#04X} (type table has {table_len} entries)")]
    UnknownTypeTag { tag: u8, table_len: usize },

    /// No handler is registered for the record's type id
    #[error("Unknown record type {0}")]
    UnknownRecordType(TypeId),

    /// Record content does not match any known layout
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Trailing size marker disagrees with the block-size table
    #[error("Block {block} size mismatch: table says {expected}, marker says {actual}")]
    BlockSizeMismatch {
        block: usize,
        expected: u32,
        actual: u32,
    },

    /// A reference points at a node that does not exist
    #[error("Node {from} references missing node {to}")]
    DanglingReference { from: u32, to: u32 },

    /// A child reference points at its own referrer
    #[error("Node {0} holds a child reference to itself")]
    SelfReference(u32),

    /// A record decoder bound the same attribute twice
    #[error("Attribute '{name}' bound twice on node {node}")]
    AttributeRebind { node: u32, name: String },

    /// Unsupported format version
    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(String),

    /// Error inflating a segment payload
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Segment did not end with the canonical terminator
    #[error("Invalid segment terminator {0}")]
    InvalidTerminator(Uuid),

    /// A required stream is absent from the storage
    #[error("Missing stream: {0}")]
    MissingStream(String),

    /// Invalid container or header layout
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// The read was cancelled between segments
    #[error("Read cancelled")]
    Cancelled,
}

/// Result type alias for invrust operations
pub type Result<T> = std::result::Result<T, InvError>;

impl InvError {
    /// Whether this error ends the decoding of the whole segment.
    ///
    /// Record-level errors (unknown tags, malformed records, rebinds) only
    /// fail the record they occur in.
    pub fn is_segment_fatal(&self) -> bool {
        !matches!(
            self,
            InvError::UnknownTypeTag { .. }
                | InvError::UnknownRecordType(_)
                | InvError::MalformedRecord(_)
                | InvError::AttributeRebind { .. }
                | InvError::DanglingReference { .. }
                | InvError::SelfReference(_)
        )
    }

    /// Short name of the error kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            InvError::Io(_) => "Io",
            InvError::TruncatedInput { .. } => "TruncatedInput",
            InvError::UnknownTypeTag { .. } => "UnknownTypeTag",
            InvError::UnknownRecordType(_) => "UnknownRecordType",
            InvError::MalformedRecord(_) => "MalformedRecord",
            InvError::BlockSizeMismatch { .. } => "BlockSizeMismatch",
            InvError::DanglingReference { .. } => "DanglingReference",
            InvError::SelfReference(_) => "SelfReference",
            InvError::AttributeRebind { .. } => "AttributeRebind",
            InvError::UnsupportedVersion(_) => "UnsupportedVersion",
            InvError::Decompression(_) => "Decompression",
            InvError::InvalidTerminator(_) => "InvalidTerminator",
            InvError::MissingStream(_) => "MissingStream",
            InvError::InvalidFormat(_) => "InvalidFormat",
            InvError::Cancelled => "Cancelled",
        }
    }
}

impl From<String> for InvError {
    fn from(s: String) -> Self {
        InvError::InvalidFormat(s)
    }
}

impl From<&str> for InvError {
    fn from(s: &str) -> Self {
        InvError::InvalidFormat(s.to_string())
    }
}

impl<I: std::fmt::Debug> From<nom::Err<nom::error::Error<I>>> for InvError {
    fn from(err: nom::Err<nom::error::Error<I>>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => InvError::InvalidFormat(format!(
                "incomplete header: {:?}",
                needed
            )),
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                InvError::InvalidFormat(format!("header parse failed: {:?}", e.code))
            }
        }
    }
}
