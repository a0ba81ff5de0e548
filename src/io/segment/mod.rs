//! Segment stream decoding.
//!
//! A segment is a compressed sub-document stored as a pair of streams under
//! `RSeStorage/`: `M<hex>` holds the preamble and the start of the zlib
//! payload, `B<hex>` the rest of it. Decoding is layered:
//!
//! - [`header`]: preamble and block-size table
//! - [`registry`]: local tag → type id tables
//! - [`compression`]: payload inflation
//! - [`record_reader`]: compound reads (headers, references, lists, maps)
//! - [`coded_float`]: compact transform encoding
//! - [`scripts`]: per-flavor record handlers
//! - [`flavor`]: segment name → handler table
//! - [`resolver`]: index → typed reference resolution
//! - [`decoder`]: the orchestrator tying it all together

pub mod coded_float;
pub mod compression;
pub mod decoder;
pub mod flavor;
pub mod header;
pub mod record_reader;
pub mod registry;
pub mod resolver;
pub mod scripts;

pub use coded_float::{CodedFloat, CodedLayout};
pub use compression::{Decompressor, ZlibDecompressor};
pub use decoder::{scan_record_end, ScanResult, SegmentDecoder};
pub use flavor::ReaderFlavor;
pub use header::{BlockEntry, SegmentHeader, TERMINATOR};
pub use record_reader::{ElementKind, KeyKind, MapValueKind, RecordReader};
pub use registry::TypeRegistry;
