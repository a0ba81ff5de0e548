//! # invrust
//!
//! A pure Rust library for decoding Autodesk Inventor part (`.ipt`) and
//! assembly (`.iam`) files written by Inventor 2010 and later.
//!
//! An Inventor file is an OLE compound document. Its `RSeStorage` storage
//! holds one pair of streams per segment (`M<hex>` metadata, `B<hex>`
//! binary); each segment is a zlib-compressed sequence of typed records.
//! This crate decodes those records into per-segment node tables, resolves
//! the references between nodes and builds a browsable graph.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invrust::io::InventorReader;
//!
//! // Read a compound document extracted to a directory
//! let model = InventorReader::from_directory("Part1.ipt.d")?.read()?;
//!
//! for table in model.tables() {
//!     println!("{}: {} nodes", table.name(), table.len());
//! }
//! print!("{}", model.graph.render());
//! # Ok::<(), invrust::error::InvError>(())
//! ```
//!
//! ## Architecture
//!
//! - `io::cursor` - primitive little-endian readers
//! - `io::segment` - segment header, record decoding, reference resolution
//! - `model` - node arena, attribute values, decoded document
//! - `graph` - ownership forest and parameter formula rendering
//! - `notification` - non-fatal diagnostics collected during a read

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod graph;
pub mod io;
pub mod model;
pub mod notification;
pub mod types;

// Re-export commonly used types
pub use error::{InvError, Result};
pub use types::{Color, FormatVersion, TypeId, Uuid};

pub use graph::{GraphRoot, SegmentGraph};
pub use io::{CompoundStorage, DirectoryStorage, InventorReader, InventorReaderConfiguration, MemoryStorage};
pub use model::{DecodedModel, Node, NodeFlags, NodeRef, SegmentNodeTable, Value};
pub use notification::{Notification, NotificationCollection, NotificationType};
