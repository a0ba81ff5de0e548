//! Cross-record references.
//!
//! A reference is stored as two `u16` halves. The node index is
//! `low | ((high & 0x7FFF) << 16)`; the top bit of `high` is a separate
//! discriminator flag. Index 0 is the null reference.

use std::fmt;

/// How a reference relates its holder to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Points at the owner of the holder.
    Parent,
    /// Owns the target; must point forward in decode order.
    Child,
    /// Non-owning association.
    Cross,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::Parent => write!(f, "parent"),
            RefKind::Child => write!(f, "child"),
            RefKind::Cross => write!(f, "cross"),
        }
    }
}

/// Resolution state of a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefTarget {
    /// Not yet visited by the resolver.
    #[default]
    Unresolved,
    /// Null, either by encoding or because the target was missing.
    Null,
    /// Resolved to the node with this index.
    Node(u32),
}

/// A reference from one node to another in the same segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    /// Low half as parsed.
    pub low: u16,
    /// High half as parsed (including the discriminator bit).
    pub high: u16,
    /// Kind declared by the record decoder.
    pub declared: RefKind,
    /// Effective kind after resolution (a backward child becomes a cross).
    pub kind: RefKind,
    /// Resolution state.
    pub target: RefTarget,
    /// Position inside the list the reference was read from, if any.
    pub number: Option<u32>,
}

impl NodeRef {
    /// Build an unresolved reference from its raw halves.
    pub fn from_raw(low: u16, high: u16, kind: RefKind) -> Self {
        Self {
            low,
            high,
            declared: kind,
            kind,
            target: RefTarget::Unresolved,
            number: None,
        }
    }

    /// Build an unresolved reference to `index` (discriminator clear).
    pub fn to_index(index: u32, kind: RefKind) -> Self {
        Self::from_raw((index & 0xFFFF) as u16, ((index >> 16) & 0x7FFF) as u16, kind)
    }

    /// Attach a list position.
    pub fn with_number(mut self, number: u32) -> Self {
        self.number = Some(number);
        self
    }

    /// Decoded node index (0 = null).
    #[inline]
    pub fn index(&self) -> u32 {
        self.low as u32 | (((self.high & 0x7FFF) as u32) << 16)
    }

    /// Discriminator bit (top bit of the high half).
    #[inline]
    pub fn flag(&self) -> bool {
        self.high & 0x8000 != 0
    }

    /// Whether the reference is null, by encoding or after resolution.
    pub fn is_null(&self) -> bool {
        self.index() == 0 || self.target == RefTarget::Null
    }

    /// Resolved target index, if resolution found one.
    pub fn target_index(&self) -> Option<u32> {
        match self.target {
            RefTarget::Node(index) => Some(index),
            _ => None,
        }
    }

    /// Whether the resolver has visited this reference.
    pub fn is_resolved(&self) -> bool {
        self.target != RefTarget::Unresolved
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            RefTarget::Null => write!(f, "{} -> null", self.kind),
            RefTarget::Node(index) => write!(f, "{} -> ({:04X})", self.kind, index),
            RefTarget::Unresolved if self.index() == 0 => write!(f, "{} -> null", self.kind),
            RefTarget::Unresolved => write!(f, "{} -> [{:04X}]", self.kind, self.index()),
        }
    }
}
