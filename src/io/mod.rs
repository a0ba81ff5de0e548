//! I/O module for reading Inventor compound documents.
//!
//! - [`storage`]: stream access over a compound document
//! - [`cursor`]: bounds-checked primitive readers
//! - [`rse`] and [`property_set`]: fixed-layout document streams
//! - [`segment`]: the segment stream decoder
//! - [`reader`]: the document reader tying them together

pub mod cursor;
pub mod property_set;
pub mod reader;
pub mod rse;
pub mod segment;
pub mod storage;

pub use reader::{InventorReader, InventorReaderConfiguration};
pub use storage::{CompoundStorage, DirectoryStorage, MemoryStorage, StreamPath};
