//! Record type identifiers.
//!
//! Inventor identifies every record kind with a 128-bit UUID. Handlers are
//! keyed by the truncated form: the UUID's first (time-low) field, which is
//! also the first eight hex digits of its canonical text form.

use std::fmt;

use uuid::Uuid;

/// A record type identifier, either a full UUID or its truncated 32-bit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    /// Full 128-bit identifier as stored in the segment's type table.
    Full(Uuid),
    /// Truncated identifier (time-low field of the UUID).
    Truncated(u32),
}

impl TypeId {
    /// Identifier used for records whose type tag could not be resolved.
    pub const NIL: TypeId = TypeId::Full(Uuid::nil());

    /// Create a full type id from a UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        TypeId::Full(uuid)
    }

    /// The 32-bit form used as the dispatch key.
    pub fn short(&self) -> u32 {
        match self {
            TypeId::Full(uuid) => uuid.as_fields().0,
            TypeId::Truncated(value) => *value,
        }
    }

    /// The full UUID, when known.
    pub fn uuid(&self) -> Option<Uuid> {
        match self {
            TypeId::Full(uuid) => Some(*uuid),
            TypeId::Truncated(_) => None,
        }
    }

    /// Whether this is the nil identifier.
    pub fn is_nil(&self) -> bool {
        matches!(self, TypeId::Full(uuid) if uuid.is_nil())
    }

    /// Reduce to the truncated form.
    pub fn truncate(&self) -> TypeId {
        TypeId::Truncated(self.short())
    }
}

impl Default for TypeId {
    fn default() -> Self {
        TypeId::NIL
    }
}

impl From<Uuid> for TypeId {
    fn from(uuid: Uuid) -> Self {
        TypeId::Full(uuid)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeId::Full(uuid) => write!(f, "{}", uuid.hyphenated()),
            TypeId::Truncated(value) => write!(f, "{:08X}", value),
        }
    }
}
