//! Per-segment type-id registry.
//!
//! Every segment preamble carries two count-prefixed UUID tables. A record's
//! local tag (the byte in front of its payload) indexes the first table.

use crate::error::{InvError, Result};
use crate::io::cursor::ByteCursor;
use crate::types::{TypeId, Uuid};

/// Local tag → type id tables of one segment. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    primary: Vec<Uuid>,
    secondary: Vec<Uuid>,
}

impl TypeRegistry {
    pub fn new(primary: Vec<Uuid>, secondary: Vec<Uuid>) -> Self {
        Self { primary, secondary }
    }

    /// Read both tables from a segment preamble.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let primary = read_table(cursor)?;
        let secondary = read_table(cursor)?;
        Ok(Self { primary, secondary })
    }

    /// Resolve a record tag against the first table.
    pub fn lookup(&self, tag: u8) -> Result<TypeId> {
        lookup_in(&self.primary, tag)
    }

    /// Resolve a tag against the second table.
    pub fn lookup_secondary(&self, tag: u8) -> Result<TypeId> {
        lookup_in(&self.secondary, tag)
    }

    pub fn primary(&self) -> &[Uuid] {
        &self.primary
    }

    pub fn secondary(&self) -> &[Uuid] {
        &self.secondary
    }
}

fn lookup_in(table: &[Uuid], tag: u8) -> Result<TypeId> {
    table
        .get(tag as usize)
        .map(|uuid| TypeId::Full(*uuid))
        .ok_or(InvError::UnknownTypeTag {
            tag,
            table_len: table.len(),
        })
}

fn read_table(cursor: &mut ByteCursor<'_>) -> Result<Vec<Uuid>> {
    let count = cursor.read_u32()? as usize;
    let mut table = Vec::with_capacity(count.min(cursor.remaining() / 16));
    for _ in 0..count {
        table.push(cursor.read_uuid()?);
    }
    Ok(table)
}
