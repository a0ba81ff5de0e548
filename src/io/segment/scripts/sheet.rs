//! Sheet segment records: drawing sheets, views and text styles.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, cross, field, list, map, Field, HandlerTable, CONTENT, HEADER0, NAME};
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind};

const SHEET: &[Field] = &[
    CONTENT,
    NAME,
    field("width", F64),
    field("height", F64),
    field("orientation", U16),
    list("views", ElementKind::ChildRef),
];

const DRAWING_VIEW: &[Field] = &[
    CONTENT,
    NAME,
    field("position", F64Array(2)),
    field("scale", F64),
    cross("designView"),
    after(2013, "style", U32),
];

const TEXT_STYLE: &[Field] = &[
    HEADER0,
    NAME,
    list("fonts", ElementKind::Font),
    field("color", Color),
];

const TITLE_BLOCK: &[Field] = &[
    HEADER0,
    NAME,
    map("fields", KeyKind::Text8, MapValueKind::List(ElementKind::Text16)),
];

const BORDER: &[Field] = &[
    HEADER0,
    field("margins", F64Array(4)),
    list("zones", ElementKind::U16x3),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x0F6B4A3E, "Sheet", Script(SHEET)),
        (0x0F6B4A3F, "DrawingView", Script(DRAWING_VIEW)),
        (0xE5FF0D0A, "TextStyle", Script(TEXT_STYLE)),
        (0x11058558, "TitleBlock", Script(TITLE_BLOCK)),
        (0x11058559, "Border", Script(BORDER)),
    ])
});
