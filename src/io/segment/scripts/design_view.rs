//! Design-view segment records: named views and their visibility state.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, field, list, map, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind};

const DESIGN_VIEW: &[Field] = &[
    HEADER0,
    NAME,
    field("camera", CodedFloat),
    field("zoom", F64),
    after(2013, "locked", Bool),
    map("visibility", KeyKind::Text16, MapValueKind::U32),
];

const DESIGN_VIEW_REP: &[Field] = &[
    HEADER0,
    NAME,
    list("views", ElementKind::CrossRef),
    field("active", U16),
];

const CAMERA: &[Field] = &[
    HEADER0,
    field("eye", F64Array(3)),
    field("target", F64Array(3)),
    field("up", F64Array(3)),
    field("fieldOfView", F64),
    field("perspective", Bool),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x0D0F9548, "DesignView", Script(DESIGN_VIEW)),
        (0x0D0F9549, "DesignViewRep", Script(DESIGN_VIEW_REP)),
        (0x8A0A2E6F, "Camera", Script(CAMERA)),
    ])
});
