//! Shared test utilities for invrust integration tests.
//!
//! Byte-level builders for segment streams, record payloads and document
//! storages, plus decode helpers that all test crates import via
//! `mod common;`.

#![allow(dead_code)]

pub mod builders;

use invrust::io::segment::SegmentDecoder;
use invrust::io::InventorReaderConfiguration;
use invrust::model::SegmentNodeTable;
use invrust::notification::NotificationCollection;
use invrust::Result;

pub use builders::{Payload, SegmentBuilder};

/// Decode one segment with the given configuration.
pub fn decode_with(
    config: &InventorReaderConfiguration,
    meta: &[u8],
    data: &[u8],
) -> (Result<SegmentNodeTable>, NotificationCollection) {
    let mut notifications = NotificationCollection::new();
    let table = SegmentDecoder::new(config).decode("RSeStorage/M1", meta, data, &mut notifications);
    (table, notifications)
}

/// Decode one segment with the default configuration.
pub fn decode(meta: &[u8], data: &[u8]) -> (Result<SegmentNodeTable>, NotificationCollection) {
    decode_with(&InventorReaderConfiguration::default(), meta, data)
}

/// Decode a built segment, expecting success.
pub fn decode_ok(segment: &SegmentBuilder) -> (SegmentNodeTable, NotificationCollection) {
    let (meta, data) = segment.build();
    let (table, notifications) = decode(&meta, &data);
    match table {
        Ok(table) => (table, notifications),
        Err(e) => panic!("segment failed to decode: {e}"),
    }
}
