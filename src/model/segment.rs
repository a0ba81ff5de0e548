//! Per-segment node table.

use crate::graph::SegmentGraph;
use crate::io::segment::flavor::ReaderFlavor;
use crate::io::segment::header::SegmentHeader;
use crate::io::segment::registry::TypeRegistry;
use crate::model::document::SegmentInfoEntry;
use crate::model::node::Node;

/// A radius element measuring a curve, recorded by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusBinding {
    /// Index of the `Radius2D` node.
    pub radius: u32,
    /// Index of the circle or ellipse it measures.
    pub entity: u32,
}

/// All nodes decoded from one segment, plus the context they were decoded in.
///
/// Node `i` lives at position `i - 1` of [`SegmentNodeTable::nodes`]; indices
/// are dense and start at 1.
#[derive(Debug, Clone)]
pub struct SegmentNodeTable {
    /// Parsed segment preamble.
    pub header: SegmentHeader,
    /// Local tag → type id tables.
    pub registry: TypeRegistry,
    /// Reader flavor chosen from the segment name.
    pub flavor: ReaderFlavor,
    /// Path of the metadata stream the segment was read from.
    pub stream: String,
    /// Decoded nodes in decode order.
    pub nodes: Vec<Node>,
    /// Radius elements and the curves they measure.
    pub radius_bindings: Vec<RadiusBinding>,
    /// Built tree, when graph building is enabled.
    pub graph: Option<SegmentGraph>,
    /// Directory entry describing this segment, if the directory lists it.
    pub segment_info: Option<SegmentInfoEntry>,
}

impl SegmentNodeTable {
    /// Create an empty table.
    pub fn new(
        header: SegmentHeader,
        registry: TypeRegistry,
        flavor: ReaderFlavor,
        stream: impl Into<String>,
    ) -> Self {
        Self {
            header,
            registry,
            flavor,
            stream: stream.into(),
            nodes: Vec::new(),
            radius_bindings: Vec::new(),
            graph: None,
            segment_info: None,
        }
    }

    /// Segment name from the preamble.
    pub fn name(&self) -> &str {
        &self.header.name
    }

    /// Node with the given index.
    pub fn get(&self, index: u32) -> Option<&Node> {
        if index == 0 {
            return None;
        }
        self.nodes.get(index as usize - 1)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut Node> {
        if index == 0 {
            return None;
        }
        self.nodes.get_mut(index as usize - 1)
    }

    /// Whether a node with this index exists.
    pub fn contains(&self, index: u32) -> bool {
        index != 0 && (index as usize) <= self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// Nodes whose type name matches.
    pub fn nodes_of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .iter()
            .filter(move |n| n.type_name == Some(type_name))
    }

    /// Append a node; its index must be the next dense index.
    pub(crate) fn push(&mut self, node: Node) {
        debug_assert_eq!(node.index as usize, self.nodes.len() + 1);
        self.nodes.push(node);
    }
}
