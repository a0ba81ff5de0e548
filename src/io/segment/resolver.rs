//! Reference resolution.
//!
//! Runs once per segment after every record is decoded. Each [`NodeRef`] in
//! every attribute (lists and maps included) gets its resolved target:
//!
//! 1. index 0 → null;
//! 2. index outside the table → `DanglingReference` warning, null;
//! 3. a child edge pointing backward becomes a cross edge;
//! 4. a child edge pointing at its own holder is a `SelfReference` error;
//!    the edge is nulled and the node is detached from the tree.
//!
//! [`NodeRef`]: crate::model::NodeRef

use crate::error::InvError;
use crate::model::node::NodeFlags;
use crate::model::node_ref::{RefKind, RefTarget};
use crate::model::segment::{RadiusBinding, SegmentNodeTable};
use crate::notification::{Notification, NotificationCollection, NotificationType};

/// Type names a radius element may measure.
const RADIUS_TARGETS: &[&str] = &["Circle2D", "Ellipse2D", "Circle3D", "Ellipse3D"];

enum Finding {
    Dangling(u32),
    SelfChild,
}

/// Resolve every reference of `table` in place.
pub fn resolve(table: &mut SegmentNodeTable, notifications: &mut NotificationCollection) {
    let count = table.nodes.len() as u32;
    let stream = table.stream.clone();

    for node in table.nodes.iter_mut() {
        let from = node.index;
        let mut findings = Vec::new();
        for value in node.attributes.values_mut() {
            value.for_each_ref_mut(&mut |r| {
                let to = r.index();
                r.kind = r.declared;
                if to == 0 {
                    r.target = RefTarget::Null;
                } else if to > count {
                    r.target = RefTarget::Null;
                    findings.push(Finding::Dangling(to));
                } else if r.declared == RefKind::Child && to == from {
                    r.target = RefTarget::Null;
                    findings.push(Finding::SelfChild);
                } else {
                    if r.declared == RefKind::Child && to < from {
                        r.kind = RefKind::Cross;
                    }
                    r.target = RefTarget::Node(to);
                }
            });
        }

        for finding in findings {
            let (nt, error) = match finding {
                Finding::Dangling(to) => (
                    NotificationType::Warning,
                    InvError::DanglingReference { from, to },
                ),
                Finding::SelfChild => {
                    node.flags.insert(NodeFlags::SELF_REFERENCE);
                    (NotificationType::Error, InvError::SelfReference(from))
                }
            };
            notifications.push(
                Notification::from_error(nt, &error)
                    .with_stream(stream.as_str())
                    .at(node.offset)
                    .for_type(node.type_id),
            );
        }
    }

    table.radius_bindings = radius_bindings(table);
}

/// Radius elements holding a cross edge to a circle or ellipse.
fn radius_bindings(table: &SegmentNodeTable) -> Vec<RadiusBinding> {
    let mut bindings = Vec::new();
    for node in table.nodes_of_type("Radius2D") {
        for (_, r) in node.refs_of_kind(RefKind::Cross) {
            let Some(target) = r.target_index().and_then(|i| table.get(i)) else {
                continue;
            };
            if target
                .type_name
                .map_or(false, |name| RADIUS_TARGETS.contains(&name))
            {
                bindings.push(RadiusBinding {
                    radius: node.index,
                    entity: target.index,
                });
            }
        }
    }
    bindings
}
