//! Segment graph building.
//!
//! Turns a resolved node table into a forest. The owner of a node is the
//! first node, in index order, holding a resolved child edge to it; nodes
//! without an owner are roots. Every other edge (cross edges, later child
//! edges to an already owned node) becomes a leaf annotation on the branch
//! holding it. Nodes flagged as self-referencing are listed apart and take
//! no part in the tree.

use std::fmt::Write;

use crate::graph::expression::{self, RenderOptions};
use crate::model::node::{Node, NodeFlags};
use crate::model::node_ref::RefKind;
use crate::model::segment::SegmentNodeTable;
use crate::notification::{Notification, NotificationCollection, NotificationType};

const DIMENSION_TYPES: &[&str] = &[
    "Dimension_Angle2D",
    "Dimension_Distance2D",
    "Dimension_Distance_Horizontal2D",
    "Dimension_Distance_Vertical2D",
    "Dimension_Radius2D",
    "Dimension_Diameter2D",
];

const VALUE_TYPES: &[&str] = &[
    "ValueByte",
    "ValueSInt32",
    "ValueUInt32",
    "ValueDouble",
    "ParameterConstant",
];

/// What a branch stands for, beyond its plain node.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchKind {
    Plain,
    /// A sketch dimension and the formula of its driving parameter.
    Dimension {
        parameter: Option<u32>,
        formula: Option<String>,
    },
    /// A modeling feature; the sub-type comes from its first property.
    Feature { sub_type: Option<String> },
    /// A literal value node.
    Value { literal: String },
}

/// A non-owning edge shown as a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    /// Attribute holding the edge.
    pub attribute: &'static str,
    /// Index of the referenced node.
    pub target: u32,
}

/// One node's place in the forest.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub index: u32,
    pub type_name: String,
    pub name: Option<String>,
    pub kind: BranchKind,
    /// Node owning this one through a child edge.
    pub owner: Option<u32>,
    /// Target of the node's first parent reference.
    pub parent: Option<u32>,
    /// Owned nodes, in index order.
    pub children: Vec<u32>,
    pub annotations: Vec<Annotation>,
    /// Synthetic edges such as `radius` on measured curves.
    pub bindings: Vec<(&'static str, u32)>,
}

impl Branch {
    fn new(node: &Node) -> Self {
        Self {
            index: node.index,
            type_name: node.type_label(),
            name: node.name.clone(),
            kind: BranchKind::Plain,
            owner: None,
            parent: None,
            children: Vec::new(),
            annotations: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// `(index): TypeName 'Name'`.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("({}): {} '{}'", self.index, self.type_name, name),
            None => format!("({}): {}", self.index, self.type_name),
        }
    }
}

/// The forest built from one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentGraph {
    /// Branch of node `i` at position `i - 1`.
    pub branches: Vec<Branch>,
    /// Nodes without an owner, in index order.
    pub roots: Vec<u32>,
    /// Self-referencing nodes kept out of the tree.
    pub detached: Vec<u32>,
}

impl SegmentGraph {
    pub fn branch(&self, index: u32) -> Option<&Branch> {
        index
            .checked_sub(1)
            .and_then(|i| self.branches.get(i as usize))
    }

    /// Render the forest as indented text, two spaces per level.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.render_tree(root, 0, &mut out);
        }
        for &index in &self.detached {
            if let Some(branch) = self.branch(index) {
                let _ = writeln!(out, "{} (detached)", branch.label());
            }
        }
        out
    }

    fn render_tree(&self, root: u32, depth: usize, out: &mut String) {
        let mut stack = vec![(root, depth)];
        while let Some((index, depth)) = stack.pop() {
            let Some(branch) = self.branch(index) else {
                continue;
            };
            let indent = "  ".repeat(depth);
            let _ = write!(out, "{indent}{}", branch.label());
            match &branch.kind {
                BranchKind::Plain => {}
                BranchKind::Dimension { formula, .. } => {
                    if let Some(formula) = formula {
                        let _ = write!(out, " = {formula}");
                    }
                }
                BranchKind::Feature { sub_type } => {
                    if let Some(sub_type) = sub_type {
                        let _ = write!(out, " [{sub_type}]");
                    }
                }
                BranchKind::Value { literal } => {
                    let _ = write!(out, " = {literal}");
                }
            }
            out.push('\n');

            for annotation in &branch.annotations {
                if let Some(target) = self.branch(annotation.target) {
                    let _ = writeln!(out, "{indent}  -> {}", target.label());
                }
            }
            for &(name, source) in &branch.bindings {
                if let Some(source) = self.branch(source) {
                    let _ = writeln!(out, "{indent}  {name} -> {}", source.label());
                }
            }
            for &child in branch.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }
}

/// Build the forest of a resolved segment.
///
/// Formulas that cannot be rendered fall back to the parameter's nominal
/// value and are reported as warnings.
pub fn build_segment_graph(
    table: &SegmentNodeTable,
    notifications: &mut NotificationCollection,
) -> SegmentGraph {
    let mut graph = SegmentGraph {
        branches: table.iter().map(Branch::new).collect(),
        ..Default::default()
    };

    for node in table.iter() {
        if node.flags.contains(NodeFlags::SELF_REFERENCE) {
            graph.detached.push(node.index);
            continue;
        }
        for (attribute, r) in node.refs() {
            let Some(target) = r.target_index() else {
                continue;
            };
            let slot = (target - 1) as usize;
            match r.kind {
                RefKind::Parent => {
                    let branch = &mut graph.branches[(node.index - 1) as usize];
                    branch.parent.get_or_insert(target);
                }
                RefKind::Child
                    if graph.branches[slot].owner.is_none()
                        && !is_detached(table, target) =>
                {
                    graph.branches[slot].owner = Some(node.index);
                    graph.branches[(node.index - 1) as usize]
                        .children
                        .push(target);
                }
                _ => graph.branches[(node.index - 1) as usize]
                    .annotations
                    .push(Annotation { attribute, target }),
            }
        }
    }

    for branch in graph.branches.iter_mut() {
        branch.children.sort_unstable();
    }

    graph.roots = graph
        .branches
        .iter()
        .filter(|b| b.owner.is_none() && !is_detached(table, b.index))
        .map(|b| b.index)
        .collect();

    for binding in &table.radius_bindings {
        if let Some(branch) = graph.branches.get_mut((binding.entity - 1) as usize) {
            branch.bindings.push(("radius", binding.radius));
        }
    }

    for node in table.iter() {
        let kind = branch_kind(table, node, notifications);
        graph.branches[(node.index - 1) as usize].kind = kind;
    }

    graph
}

fn is_detached(table: &SegmentNodeTable, index: u32) -> bool {
    table
        .get(index)
        .map_or(false, |n| n.flags.contains(NodeFlags::SELF_REFERENCE))
}

fn branch_kind(
    table: &SegmentNodeTable,
    node: &Node,
    notifications: &mut NotificationCollection,
) -> BranchKind {
    let Some(type_name) = node.type_name else {
        return BranchKind::Plain;
    };

    if DIMENSION_TYPES.contains(&type_name) {
        let parameter = node
            .attributes
            .get_ref("parameter")
            .and_then(|r| r.target_index());
        let formula = parameter.and_then(|p| {
            let (text, error) = expression::parameter_formula(table, p, RenderOptions::default());
            if let Some(error) = error {
                notifications.push(
                    Notification::new(
                        NotificationType::Warning,
                        format!("formula of parameter {p} falls back to its value: {error}"),
                    )
                    .with_stream(table.stream.as_str())
                    .at(node.offset)
                    .for_type(node.type_id),
                );
            }
            let name = table.get(p).and_then(|n| n.name.clone());
            match (name, text) {
                (Some(name), Some(text)) => Some(format!("{name} = {text}")),
                (None, text) => text,
                (Some(name), None) => Some(name),
            }
        });
        return BranchKind::Dimension { parameter, formula };
    }

    if type_name.starts_with("Fx") {
        let sub_type = node
            .attributes
            .get_list("properties")
            .and_then(|list| list.items.first())
            .map(|first| match first.as_node_ref() {
                Some(r) => match r.target_index().and_then(|i| table.get(i)) {
                    Some(target) => target.name.clone().unwrap_or_else(|| target.type_label()),
                    None => format!("({})", r.index()),
                },
                None => expression::value_literal(first),
            });
        return BranchKind::Feature { sub_type };
    }

    if VALUE_TYPES.contains(&type_name) {
        let literal = match (type_name, &node.name) {
            ("ParameterConstant", Some(name)) => name.clone(),
            _ => node
                .attributes
                .get("value")
                .map(expression::value_literal)
                .unwrap_or_default(),
        };
        return BranchKind::Value { literal };
    }

    BranchKind::Plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::segment::flavor::ReaderFlavor;
    use crate::io::segment::header::SegmentHeader;
    use crate::io::segment::registry::TypeRegistry;
    use crate::io::segment::resolver::resolve;
    use crate::model::node_ref::NodeRef;
    use crate::model::value::{ListShape, ListValue, Value};
    use crate::types::{FormatVersion, TypeId};

    fn table(nodes: Vec<Node>) -> SegmentNodeTable {
        let mut t = SegmentNodeTable::new(
            SegmentHeader::empty("AmDcSegment", FormatVersion::V2012),
            TypeRegistry::default(),
            ReaderFlavor::Dc,
            "RSeStorage/M1",
        );
        for n in nodes {
            t.push(n);
        }
        resolve(&mut t, &mut NotificationCollection::new());
        t
    }

    fn node(index: u32, type_name: &'static str, refs: &[(&'static str, u32, RefKind)]) -> Node {
        let mut n = Node::new(index, TypeId::NIL, 0, Vec::new());
        n.type_name = Some(type_name);
        for &(name, to, kind) in refs {
            n.attributes
                .replace(name, Value::Ref(NodeRef::to_index(to, kind)));
        }
        n
    }

    fn build(t: &SegmentNodeTable) -> SegmentGraph {
        build_segment_graph(t, &mut NotificationCollection::new())
    }

    #[test]
    fn test_parent_child_pair() {
        let t = table(vec![
            node(1, "Sketch2D", &[("label", 2, RefKind::Child)]),
            node(2, "Line2D", &[("parent", 1, RefKind::Parent)]),
        ]);
        let g = build(&t);
        assert_eq!(g.roots, vec![1]);
        assert_eq!(g.branch(1).unwrap().children, vec![2]);
        assert_eq!(g.branch(2).unwrap().parent, Some(1));
        assert_eq!(g.render(), "(1): Sketch2D\n  (2): Line2D\n");
    }

    #[test]
    fn test_second_owner_becomes_annotation() {
        let t = table(vec![
            node(1, "A", &[("x", 3, RefKind::Child)]),
            node(2, "B", &[("y", 3, RefKind::Child)]),
            node(3, "C", &[]),
        ]);
        let g = build(&t);
        assert_eq!(g.roots, vec![1, 2]);
        assert_eq!(g.branch(3).unwrap().owner, Some(1));
        assert_eq!(
            g.branch(2).unwrap().annotations,
            vec![Annotation {
                attribute: "y",
                target: 3
            }]
        );
        assert_eq!(g.render(), "(1): A\n  (3): C\n(2): B\n  -> (3): C\n");
    }

    #[test]
    fn test_backward_child_is_cross_annotation() {
        let t = table(vec![
            node(1, "A", &[]),
            node(2, "B", &[("label", 1, RefKind::Child)]),
        ]);
        let g = build(&t);
        assert_eq!(g.roots, vec![1, 2]);
        assert_eq!(g.render(), "(1): A\n(2): B\n  -> (1): A\n");
    }

    #[test]
    fn test_self_reference_detached() {
        let t = table(vec![
            node(1, "A", &[("x", 2, RefKind::Child)]),
            node(2, "B", &[("self", 2, RefKind::Child)]),
        ]);
        let g = build(&t);
        assert_eq!(g.detached, vec![2]);
        assert_eq!(g.roots, vec![1]);
        assert!(g.branch(1).unwrap().children.is_empty());
    }

    #[test]
    fn test_feature_sub_type() {
        let mut feature = node(1, "FxExtrusion", &[]);
        feature.name = Some("Extrusion1".into());
        feature.attributes.replace(
            "properties",
            Value::List(ListValue {
                shape: ListShape::Sequence,
                items: vec![Value::Ref(
                    NodeRef::to_index(2, RefKind::Cross).with_number(0),
                )],
            }),
        );
        let mut op = node(2, "FeatureOperation", &[]);
        op.name = Some("NewBody".into());
        let g = build(&table(vec![feature, op]));
        assert_eq!(
            g.branch(1).unwrap().kind,
            BranchKind::Feature {
                sub_type: Some("NewBody".into())
            }
        );
    }

    #[test]
    fn test_radius_binding_on_curve() {
        let t = table(vec![
            node(1, "Circle2D", &[]),
            node(2, "Radius2D", &[("entity", 1, RefKind::Cross)]),
        ]);
        let g = build(&t);
        assert_eq!(g.branch(1).unwrap().bindings, vec![("radius", 2)]);
        assert!(g.render().contains("  radius -> (2): Radius2D\n"));
    }
}
