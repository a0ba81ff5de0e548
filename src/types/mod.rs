//! Fundamental value types shared by the decoder and the node model.

pub mod color;
pub mod type_id;
pub mod version;

pub use color::Color;
pub use type_id::TypeId;
pub use version::FormatVersion;

pub use uuid::Uuid;
