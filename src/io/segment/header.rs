//! Segment preamble: the leading part of a segment's metadata stream.
//!
//! Layout:
//!
//! ```text
//! u32       format version (2010, 2011, ...)
//! text8     segment name
//! u8        has target; if 1, UUID of the target segment
//! text16    description
//! text16    comment
//! u32 + n*UUID   primary type table
//! u32 + n*UUID   secondary type table
//! u32 + n*u32    block-size table (length: low 31 bits, flag: top bit)
//! u8        0x01
//! ...       start of the zlib stream, continued in the binary stream
//! ```

use crate::error::{InvError, Result};
use crate::io::cursor::ByteCursor;
use crate::io::segment::registry::TypeRegistry;
use crate::types::{FormatVersion, Uuid};

/// UUID every decompressed segment ends with.
pub const TERMINATOR: Uuid = Uuid::from_u128(0x9744e6a4_11d1_8dd8_0008_2998bedddc09);

/// Byte that separates the preamble from the compressed payload.
pub const PAYLOAD_MARKER: u8 = 0x01;

/// One entry of the block-size table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    /// Payload length in bytes.
    pub length: u32,
    /// `true` for record blocks, `false` for auxiliary sections.
    pub is_record: bool,
}

impl BlockEntry {
    /// Unpack a `(length: 31 bits, flag: 1 bit)` word.
    pub fn from_packed(word: u32) -> Self {
        Self {
            length: word & 0x7FFF_FFFF,
            is_record: word >> 31 == 1,
        }
    }

    /// Packed on-disk form.
    pub fn packed(&self) -> u32 {
        (self.length & 0x7FFF_FFFF) | ((self.is_record as u32) << 31)
    }
}

/// Parsed segment preamble.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentHeader {
    /// Segment name; selects the reader flavor.
    pub name: String,
    /// Format generation of the segment.
    pub version: FormatVersion,
    /// Segment this one refers to, if any.
    pub target: Option<Uuid>,
    /// First descriptive string.
    pub description: String,
    /// Second descriptive string.
    pub comment: String,
    /// Block-size table in payload order.
    pub blocks: Vec<BlockEntry>,
}

impl SegmentHeader {
    /// Header with no blocks, for segments built in memory.
    pub fn empty(name: impl Into<String>, version: FormatVersion) -> Self {
        Self {
            name: name.into(),
            version,
            target: None,
            description: String::new(),
            comment: String::new(),
            blocks: Vec::new(),
        }
    }

    /// Number of record blocks.
    pub fn record_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_record).count()
    }
}

/// Read the preamble and leave the cursor at the first compressed byte.
pub fn read_preamble(cursor: &mut ByteCursor<'_>) -> Result<(SegmentHeader, TypeRegistry)> {
    let raw_version = cursor.read_u32()?;
    let version = FormatVersion::parse(raw_version)
        .ok_or_else(|| InvError::UnsupportedVersion(raw_version.to_string()))?;

    let name = cursor.read_text8()?;
    let target = match cursor.read_u8()? {
        0 => None,
        _ => Some(cursor.read_uuid()?),
    };
    let description = cursor.read_text16()?;
    let comment = cursor.read_text16()?;

    let registry = TypeRegistry::read(cursor)?;

    let count = cursor.read_u32()? as usize;
    let blocks = cursor
        .read_u32_array(count)?
        .into_iter()
        .map(BlockEntry::from_packed)
        .collect();

    let offset = cursor.absolute_position();
    let marker = cursor.read_u8()?;
    if marker != PAYLOAD_MARKER {
        return Err(InvError::InvalidFormat(format!(
            "expected payload marker {PAYLOAD_MARKER:#04X} at {offset:#X}, found {marker:#04X}"
        )));
    }

    Ok((
        SegmentHeader {
            name,
            version,
            target,
            description,
            comment,
            blocks,
        },
        registry,
    ))
}
