//! Decoded records and their attribute maps.

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::model::node_ref::{NodeRef, RefKind};
use crate::model::value::{ListValue, Value};
use crate::types::TypeId;

bitflags! {
    /// Decoder state attached to a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct NodeFlags: u8 {
        /// The record decoder failed; attributes may be partial.
        const ERROR = 0x01;
        /// No handler is registered for the record's type.
        const UNKNOWN_TYPE = 0x02;
        /// The record's true size was recovered by the forward scan.
        const VARIABLE_SIZE = 0x04;
        /// The node holds a child reference to itself.
        const SELF_REFERENCE = 0x08;
        /// Another node owns this one through a child edge.
        const HAS_OWNER = 0x10;
    }
}

/// Ordered attribute map keyed by attribute name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeMap {
    entries: IndexMap<&'static str, Value>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, returning the previous value if the name was bound.
    ///
    /// The record reader turns a returned value into an `AttributeRebind`
    /// diagnostic; callers that mean to overwrite use [`AttributeMap::replace`].
    pub fn insert(&mut self, name: &'static str, value: Value) -> Option<Value> {
        self.entries.insert(name, value)
    }

    /// Explicitly overwrite `name`.
    pub fn replace(&mut self, name: &'static str, value: Value) {
        self.entries.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.entries.get_mut(name)
    }

    /// Remove `name`, keeping the order of the remaining entries.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.entries.values_mut()
    }

    pub fn get_ref(&self, name: &str) -> Option<&NodeRef> {
        self.get(name).and_then(Value::as_node_ref)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn get_list(&self, name: &str) -> Option<&ListValue> {
        self.get(name).and_then(Value::as_list)
    }
}

/// A decoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in the segment's node table (1-based, dense).
    pub index: u32,
    /// Type id that selected the record decoder.
    pub type_id: TypeId,
    /// Human-readable record type, when the decoder knows it.
    pub type_name: Option<&'static str>,
    /// User-visible label read from the record.
    pub name: Option<String>,
    /// Offset of the record payload in the decompressed segment buffer.
    pub offset: usize,
    /// Size of the record payload.
    pub size: usize,
    /// Raw record payload.
    pub data: Vec<u8>,
    /// Named attributes in decode order.
    pub attributes: AttributeMap,
    /// Decoder state.
    pub flags: NodeFlags,
    /// Message of the error that failed the record, if any.
    pub error: Option<String>,
}

impl Node {
    /// Create an empty node shell bound to its record bytes.
    pub fn new(index: u32, type_id: TypeId, offset: usize, data: Vec<u8>) -> Self {
        Self {
            index,
            type_id,
            type_name: None,
            name: None,
            offset,
            size: data.len(),
            data,
            attributes: AttributeMap::new(),
            flags: NodeFlags::empty(),
            error: None,
        }
    }

    /// Record type name, or the type id when the type is unknown.
    pub fn type_label(&self) -> String {
        match self.type_name {
            Some(name) => name.to_string(),
            None => self.type_id.truncate().to_string(),
        }
    }

    /// Whether the record decoder failed on this node.
    pub fn has_error(&self) -> bool {
        self.flags.contains(NodeFlags::ERROR)
    }

    /// Mark the node as failed.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.flags.insert(NodeFlags::ERROR);
        self.error = Some(message.into());
    }

    /// Every reference held by the node, in attribute order.
    pub fn refs(&self) -> Vec<(&'static str, NodeRef)> {
        let mut out = Vec::new();
        for (name, value) in self.attributes.iter() {
            value.for_each_ref(&mut |r| out.push((name, *r)));
        }
        out
    }

    /// Resolved references of the given effective kind.
    pub fn refs_of_kind(&self, kind: RefKind) -> Vec<(&'static str, NodeRef)> {
        self.refs()
            .into_iter()
            .filter(|(_, r)| r.kind == kind && r.target_index().is_some())
            .collect()
    }

    /// First resolved parent reference.
    pub fn parent_index(&self) -> Option<u32> {
        self.refs()
            .into_iter()
            .find(|(_, r)| r.kind == RefKind::Parent && r.target_index().is_some())
            .and_then(|(_, r)| r.target_index())
    }
}
