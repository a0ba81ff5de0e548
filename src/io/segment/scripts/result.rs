//! Result segment records: computed results keyed by source objects.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, cross, field, list, map, Field, HandlerTable, HEADER0};
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind};

const RESULT_ROOT: &[Field] = &[
    HEADER0,
    map("items", KeyKind::U32, MapValueKind::ChildRef),
];

const RESULT_ITEM: &[Field] = &[
    HEADER0,
    field("source", Uuid),
    field("state", U32),
    list("indices", ElementKind::U32),
    after(2015, "stamp", I16),
];

const RESULT_BODY: &[Field] = &[
    HEADER0,
    cross("body"),
    field("volume", F64),
    field("extent", F64Array(6)),
];

const RESULT_INDEX: &[Field] = &[
    HEADER0,
    map("byKey", KeyKind::U16, MapValueKind::CrossRef),
    field("ranges", I32Array(2)),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x3C7F67AA, "ResultRoot", Script(RESULT_ROOT)),
        (0x3C7F67AB, "ResultItem", Script(RESULT_ITEM)),
        (0x3C7F67AC, "ResultBody", Script(RESULT_BODY)),
        (0x3C7F67AD, "ResultIndex", Script(RESULT_INDEX)),
    ])
});
