//! EE-data segment records: keyed numeric data sets.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{build_table, field, list, map, Field, HandlerTable, HEADER0};
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind};

const EE_DATA_ROOT: &[Field] = &[HEADER0, list("entries", ElementKind::ChildRef)];

const EE_DATA_ENTRY: &[Field] = &[
    HEADER0,
    field("key", Uuid),
    map("values", KeyKind::Uuid, MapValueKind::F64),
];

const EE_DATA_SERIES: &[Field] = &[
    HEADER0,
    field("key", Uuid),
    map("series", KeyKind::U32, MapValueKind::List(ElementKind::F64)),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x6E176BB6, "EeDataRoot", Script(EE_DATA_ROOT)),
        (0x6E176BB7, "EeDataEntry", Script(EE_DATA_ENTRY)),
        (0x6E176BB8, "EeDataSeries", Script(EE_DATA_SERIES)),
    ])
});
