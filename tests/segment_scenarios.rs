//! End-to-end segment decoding: literal segment bytes in, node tables out.

mod common;

use common::builders::type_uuid;
use common::{decode, decode_ok, decode_with, Payload, SegmentBuilder};
use invrust::io::InventorReaderConfiguration;
use invrust::model::{NodeFlags, RefKind, Value};
use invrust::notification::NotificationType;
use invrust::{InvError, TypeId};

const BROWSER_FOLDER: u32 = 0x7C44E2A3;
const DISPLAY_SETTINGS: u32 = 0x4D36D4F9;
const MESH_PART: u32 = 0x60FD1845;

fn folder(name: &str, parent: u32, children: &[u32]) -> Vec<u8> {
    Payload::new()
        .header0()
        .text16(name)
        .node_ref(parent)
        .ref_list(children)
        .finish()
}

fn display_settings() -> Vec<u8> {
    Payload::new().u32(1).u32(2).u32(3).finish()
}

fn mesh_part(face_count: u32) -> Vec<u8> {
    Payload::new().header0().node_ref(0).u32(face_count).finish()
}

#[test]
fn test_empty_segment() {
    let (table, notifications) = decode_ok(&SegmentBuilder::new("AmDcSegment", 2012));
    assert!(table.is_empty());
    assert_eq!(table.name(), "AmDcSegment");
    assert!(notifications.is_empty());
    assert!(table.graph.as_ref().unwrap().roots.is_empty());
}

#[test]
fn test_single_u32_record() {
    let segment = SegmentBuilder::new("AmCustomSegment", 2012).record(0x0A0B0C0D, vec![0x0A, 0, 0, 0]);
    let (table, notifications) = decode_ok(&segment);
    assert_eq!(table.len(), 1);
    let node = table.get(1).unwrap();
    assert_eq!(node.data, vec![0x0A, 0x00, 0x00, 0x00]);
    assert_eq!(node.type_id, TypeId::Full(type_uuid(0x0A0B0C0D)));
    assert!(node.flags.contains(NodeFlags::UNKNOWN_TYPE));
    assert_eq!(table.graph.as_ref().unwrap().roots, vec![1]);

    assert!(!notifications.has_type(NotificationType::Warning));
    assert_eq!(notifications.of_type(NotificationType::NotImplemented).len(), 1);
}

#[test]
fn test_parent_child_pair() {
    let segment = SegmentBuilder::new("PmBrowserSegment", 2012)
        .record(BROWSER_FOLDER, folder("Origin", 0, &[2]))
        .record(BROWSER_FOLDER, folder("XY Plane", 1, &[]));
    let (table, notifications) = decode_ok(&segment);
    assert!(notifications.is_empty());
    assert_eq!(table.get(1).unwrap().name.as_deref(), Some("Origin"));
    assert!(table.get(2).unwrap().flags.contains(NodeFlags::HAS_OWNER));

    let graph = table.graph.as_ref().unwrap();
    assert_eq!(graph.roots, vec![1]);
    assert_eq!(graph.branch(1).unwrap().children, vec![2]);
    assert_eq!(graph.branch(2).unwrap().parent, Some(1));
    assert_eq!(
        graph.render(),
        "(1): BrowserFolder 'Origin'\n  (2): BrowserFolder 'XY Plane'\n"
    );
}

#[test]
fn test_backward_child_promoted_to_cross() {
    let segment = SegmentBuilder::new("PmBrowserSegment", 2012)
        .record(BROWSER_FOLDER, folder("A", 0, &[]))
        .record(BROWSER_FOLDER, folder("B", 0, &[1]));
    let (table, _) = decode_ok(&segment);

    let children = table.get(2).unwrap().attributes.get_list("children").unwrap();
    let r = children.items[0].as_node_ref().unwrap();
    assert_eq!(r.declared, RefKind::Child);
    assert_eq!(r.kind, RefKind::Cross);
    assert_eq!(r.target_index(), Some(1));

    let graph = table.graph.as_ref().unwrap();
    assert_eq!(graph.roots, vec![1, 2]);
    assert_eq!(
        graph.render(),
        "(1): BrowserFolder 'A'\n(2): BrowserFolder 'B'\n  -> (1): BrowserFolder 'A'\n"
    );
}

#[test]
fn test_dangling_reference_nulled() {
    let segment = SegmentBuilder::new("PmBrowserSegment", 2012)
        .record(BROWSER_FOLDER, folder("A", 0, &[99]))
        .record(BROWSER_FOLDER, folder("B", 0, &[]));
    let (table, notifications) = decode_ok(&segment);

    let children = table.get(1).unwrap().attributes.get_list("children").unwrap();
    let r = children.items[0].as_node_ref().unwrap();
    assert_eq!(r.index(), 99);
    assert!(r.is_null());
    assert_eq!(notifications.of_kind("DanglingReference").len(), 1);
    assert_eq!(notifications.of_type(NotificationType::Warning).len(), 1);
}

#[test]
fn test_version_gated_fields() {
    let old = SegmentBuilder::new("AmAppSegment", 2010).record(DISPLAY_SETTINGS, display_settings());
    let (table, _) = decode_ok(&old);
    let node = table.get(1).unwrap();
    assert_eq!(node.attributes.get_i64("flags"), Some(1));
    assert!(!node.attributes.contains("displayStyle"));
    assert!(!node.attributes.contains("edgeMode"));
    match node.attributes.get("residual") {
        Some(Value::Bytes(rest)) => assert_eq!(rest.len(), 8),
        other => panic!("expected residual bytes, got {other:?}"),
    }

    let new = SegmentBuilder::new("AmAppSegment", 2012).record(DISPLAY_SETTINGS, display_settings());
    let (table, _) = decode_ok(&new);
    let node = table.get(1).unwrap();
    assert_eq!(node.attributes.get_i64("displayStyle"), Some(2));
    assert_eq!(node.attributes.get_i64("edgeMode"), Some(3));
    assert!(!node.attributes.contains("residual"));
}

#[test]
fn test_long_trailer_from_2015() {
    let segment = SegmentBuilder::new("AmAppSegment", 2015)
        .record(DISPLAY_SETTINGS, display_settings())
        .aux(vec![0xEE; 6])
        .record(DISPLAY_SETTINGS, display_settings());
    let (table, notifications) = decode_ok(&segment);
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(2).unwrap().attributes.get_i64("edgeMode"), Some(3));
    assert!(notifications.is_empty());
}

#[test]
fn test_block_size_mismatch_fails_segment() {
    let segment =
        SegmentBuilder::new("AmAppSegment", 2012).record_with_marker(DISPLAY_SETTINGS, display_settings(), 16);
    let (meta, data) = segment.build();
    match decode(&meta, &data).0 {
        Err(InvError::BlockSizeMismatch {
            block,
            expected,
            actual,
        }) => {
            assert_eq!(block, 0);
            assert_eq!(expected, 12);
            assert_eq!(actual, 16);
        }
        other => panic!("expected BlockSizeMismatch, got {other:?}"),
    }
}

#[test]
fn test_unknown_tag_fails_only_the_record() {
    let mut segment = SegmentBuilder::new("AmAppSegment", 2012);
    segment.type_tag(DISPLAY_SETTINGS);
    let segment = segment
        .record_tagged(7, vec![1, 2, 3, 4])
        .record(DISPLAY_SETTINGS, display_settings());
    let (table, notifications) = decode_ok(&segment);
    assert_eq!(table.len(), 2);

    let bad = table.get(1).unwrap();
    assert!(bad.has_error());
    assert!(bad.type_id.is_nil());
    assert_eq!(bad.data, vec![1, 2, 3, 4]);
    assert_eq!(notifications.of_kind("UnknownTypeTag").len(), 1);

    assert!(!table.get(2).unwrap().has_error());
}

#[test]
fn test_truncated_record() {
    let segment = SegmentBuilder::new("PmBrowserSegment", 2012).record(BROWSER_FOLDER, vec![0, 0, 0]);
    let (meta, data) = segment.build();
    assert!(matches!(
        decode(&meta, &data).0,
        Err(InvError::TruncatedInput { .. })
    ));

    let failsafe = InventorReaderConfiguration {
        failsafe: true,
        ..Default::default()
    };
    let (table, notifications) = decode_with(&failsafe, &meta, &data);
    let table = table.unwrap();
    assert!(table.get(1).unwrap().has_error());
    assert_eq!(notifications.of_kind("TruncatedInput").len(), 1);
}

#[test]
fn test_variable_size_record_scanned() {
    let payload = mesh_part(7);
    assert_eq!(payload.len(), 14);
    let segment = SegmentBuilder::new("DlGraphicsSegment", 2012)
        .record_overrun(MESH_PART, payload, 10, 10)
        .record(MESH_PART, mesh_part(3));
    let (table, notifications) = decode_ok(&segment);
    assert!(!notifications.has_type(NotificationType::Error));

    let mesh = table.get(1).unwrap();
    assert!(mesh.flags.contains(NodeFlags::VARIABLE_SIZE));
    assert_eq!(mesh.size, 14);
    assert_eq!(mesh.attributes.get_i64("faceCount"), Some(7));
    assert_eq!(table.get(2).unwrap().attributes.get_i64("faceCount"), Some(3));
}

#[test]
fn test_variable_size_scan_failure_keeps_partial_table() {
    let segment = SegmentBuilder::new("DlGraphicsSegment", 2012)
        .record_overrun(MESH_PART, mesh_part(7), 10, 0x7777)
        .record(MESH_PART, mesh_part(3));
    let (table, notifications) = decode_ok(&segment);
    assert_eq!(table.len(), 1);
    let mesh = table.get(1).unwrap();
    assert!(mesh.has_error());
    assert!(mesh.flags.contains(NodeFlags::VARIABLE_SIZE));
    assert_eq!(notifications.of_type(NotificationType::Error).len(), 1);
}

#[test]
fn test_bad_terminator() {
    let segment = SegmentBuilder::new("AmDcSegment", 2012).terminator(type_uuid(1));
    let (meta, data) = segment.build();
    assert!(matches!(
        decode(&meta, &data).0,
        Err(InvError::InvalidTerminator(_))
    ));
}

#[test]
fn test_bytes_after_terminator_warn() {
    let segment = SegmentBuilder::new("AmDcSegment", 2012).trailing(&[0xFF; 3]);
    let (table, notifications) = decode_ok(&segment);
    assert!(table.is_empty());
    assert_eq!(notifications.of_type(NotificationType::Warning).len(), 1);
}

#[test]
fn test_block_boundaries_hold_for_every_record() {
    let mut segment = SegmentBuilder::new("PmBrowserSegment", 2013);
    for i in 0..20u32 {
        let children: Vec<u32> = if i + 2 <= 20 { vec![i + 2] } else { Vec::new() };
        segment = segment.record(BROWSER_FOLDER, folder(&format!("F{i}"), 0, &children));
    }
    let (table, notifications) = decode_ok(&segment);
    assert_eq!(table.len(), 20);
    assert!(notifications.is_empty());
    for node in table.iter() {
        assert!(node.attributes.get("residual").is_none(), "node {}", node.index);
        if let Some(children) = node.attributes.get_list("children") {
            for item in &children.items {
                let r = item.as_node_ref().unwrap();
                assert!(r.target_index().unwrap() > node.index);
            }
        }
    }
    assert_eq!(table.graph.as_ref().unwrap().roots, vec![1]);
}

#[test]
fn test_foreign_flavor_does_not_scan() {
    let segment = SegmentBuilder::new("AmDcSegment", 2012).record_overrun(MESH_PART, mesh_part(7), 10, 10);
    let (meta, data) = segment.build();
    match decode(&meta, &data).0 {
        Err(InvError::BlockSizeMismatch {
            block,
            expected,
            actual,
        }) => {
            assert_eq!(block, 0);
            assert_eq!(expected, 10);
            assert_eq!(actual, 7);
        }
        other => panic!("expected BlockSizeMismatch, got {other:?}"),
    }
}
