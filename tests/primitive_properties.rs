//! Property tests for primitive reads, list framing, node references and
//! the resolver.

mod common;

use common::{decode, decode_ok, Payload, SegmentBuilder};
use invrust::io::cursor::ByteCursor;
use invrust::io::segment::{ElementKind, RecordReader};
use invrust::model::{NodeRef, RefKind};
use invrust::{FormatVersion, InvError};
use proptest::prelude::*;

const BROWSER_FOLDER: u32 = 0x7C44E2A3;

fn is_truncated<T>(result: invrust::Result<T>) -> bool {
    matches!(result, Err(InvError::TruncatedInput { .. }))
}

proptest! {
    #[test]
    fn primitives_read_back(a in any::<u16>(), b in any::<u32>(), c in any::<i32>(), d in any::<f64>(), e in any::<u128>()) {
        let mut data = Vec::new();
        data.extend_from_slice(&a.to_le_bytes());
        data.extend_from_slice(&b.to_le_bytes());
        data.extend_from_slice(&c.to_le_bytes());
        data.extend_from_slice(&d.to_le_bytes());
        let uuid = invrust::Uuid::from_u128(e);
        data.extend_from_slice(&uuid.to_bytes_le());

        let mut cursor = ByteCursor::new(&data);
        prop_assert_eq!(cursor.read_u16().unwrap(), a);
        prop_assert_eq!(cursor.read_u32().unwrap(), b);
        prop_assert_eq!(cursor.read_i32().unwrap(), c);
        prop_assert_eq!(cursor.read_f64().unwrap().to_bits(), d.to_bits());
        prop_assert_eq!(cursor.read_uuid().unwrap(), uuid);
        prop_assert!(cursor.at_end());
    }

    #[test]
    fn short_input_is_truncated(data in prop::collection::vec(any::<u8>(), 0..16)) {
        let mut cursor = ByteCursor::new(&data);
        if data.len() < 16 {
            prop_assert!(is_truncated(cursor.read_uuid()));
            prop_assert_eq!(cursor.position(), 0);
        }
        if data.len() < 8 {
            prop_assert!(is_truncated(cursor.read_f64()));
            prop_assert!(is_truncated(cursor.read_u64()));
        }
        if data.len() < 4 {
            prop_assert!(is_truncated(cursor.read_u32()));
        }
    }

    #[test]
    fn text_lengths(latin in "[a-zA-Z0-9 ]{0,40}", wide in "\\PC{0,20}") {
        let mut data = (latin.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(latin.as_bytes());
        let mut cursor = ByteCursor::new(&data);
        prop_assert_eq!(cursor.read_text8().unwrap(), latin.clone());
        prop_assert_eq!(cursor.position(), 4 + latin.len());

        let units: Vec<u16> = wide.encode_utf16().collect();
        let mut data = (units.len() as u32).to_le_bytes().to_vec();
        for u in &units {
            data.extend_from_slice(&u.to_le_bytes());
        }
        let mut cursor = ByteCursor::new(&data);
        prop_assert_eq!(cursor.read_text16().unwrap(), wide.clone());
        prop_assert_eq!(cursor.position(), 4 + 2 * units.len());
    }

    #[test]
    fn list_framing(values in prop::collection::vec(any::<u32>(), 0..64), tail in any::<u32>()) {
        let mut payload = Payload::new().u16(0x0002).u16(0x3000).u32(values.len() as u32).u32(0).u32(0);
        for v in &values {
            payload = payload.u32(*v);
        }
        let data = payload.u32(tail).finish();

        let mut reader = RecordReader::new(&data, 0, FormatVersion::V2012, true);
        let list = reader.read_list(ElementKind::U32).unwrap();
        prop_assert_eq!(list.items.len(), values.len());
        prop_assert_eq!(reader.position(), 16 + 4 * values.len());
        prop_assert_eq!(reader.cursor().read_u32().unwrap(), tail);
    }

    #[test]
    fn node_ref_halves(low in any::<u16>(), high in any::<u16>()) {
        let r = NodeRef::from_raw(low, high, RefKind::Cross);
        prop_assert_eq!(r.index(), low as u32 | (((high & 0x7FFF) as u32) << 16));
        prop_assert_eq!(r.flag(), (high >> 15) & 1 == 1);
        if low == 0 && high == 0 {
            prop_assert!(r.is_null());
        }
    }

    #[test]
    fn resolver_invariants(children in prop::collection::vec(prop::collection::vec(0u32..12, 0..4), 1..10)) {
        let count = children.len() as u32;
        let mut segment = SegmentBuilder::new("PmBrowserSegment", 2012);
        for (i, refs) in children.iter().enumerate() {
            let payload = Payload::new().header0().text16(&format!("N{i}")).node_ref(0).ref_list(refs);
            segment = segment.record(BROWSER_FOLDER, payload.finish());
        }
        let (table, _) = decode_ok(&segment);
        prop_assert_eq!(table.len() as u32, count);

        for node in table.iter() {
            for (_, r) in node.refs() {
                prop_assert!(r.is_resolved());
                if let Some(target) = r.target_index() {
                    prop_assert!(table.contains(target));
                    if r.kind == RefKind::Child {
                        prop_assert!(target > node.index);
                    }
                    prop_assert_eq!(target, r.index());
                }
            }
        }
    }

    #[test]
    fn decoder_never_panics(meta in prop::collection::vec(any::<u8>(), 0..256), data in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&meta, &data);
    }
}
