//! FB-attribute segment records: user attribute sets.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{build_table, cross, field, list, map, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind};

const ATTRIBUTE_SETS: &[Field] = &[HEADER0, list("sets", ElementKind::ChildRef)];

const ATTRIBUTE_SET: &[Field] = &[
    HEADER0,
    NAME,
    cross("owner"),
    map("attributes", KeyKind::Text16, MapValueKind::ChildRef),
];

const ATTRIBUTE: &[Field] = &[
    HEADER0,
    NAME,
    field("valueType", U32),
    field("value", Text16),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0xA8A2C4D1, "AttributeSets", Script(ATTRIBUTE_SETS)),
        (0xA8A2C4D2, "AttributeSet", Script(ATTRIBUTE_SET)),
        (0xA8A2C4D3, "Attribute", Script(ATTRIBUTE)),
    ])
});
