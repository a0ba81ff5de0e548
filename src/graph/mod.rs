//! Node graph built on top of the resolved node tables.
//!
//! - [`builder`]: per-segment forest of owned nodes with cross annotations
//! - [`expression`]: parameter formula rendering

pub mod builder;
pub mod expression;

use indexmap::IndexMap;

pub use builder::{build_segment_graph, Annotation, Branch, BranchKind, SegmentGraph};
pub use expression::{parameter_formula, render_parameter, ExpressionError, RenderOptions};

/// Combined graph of a document: one forest per decoded segment, in
/// directory order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphRoot {
    pub segments: IndexMap<String, SegmentGraph>,
}

impl GraphRoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment: impl Into<String>, graph: SegmentGraph) {
        self.segments.insert(segment.into(), graph);
    }

    pub fn get(&self, segment: &str) -> Option<&SegmentGraph> {
        self.segments.get(segment)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render every segment forest under a `[segment]` heading.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, graph) in &self.segments {
            out.push('[');
            out.push_str(name);
            out.push_str("]\n");
            out.push_str(&graph.render());
        }
        out
    }
}
