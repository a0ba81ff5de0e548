//! Browser segment records: the model tree shown in the UI.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, cross, field, list, parent, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::ElementKind;

const BROWSER_ROOT: &[Field] = &[HEADER0, list("nodes", ElementKind::ChildRef)];

const BROWSER_NODE: &[Field] = &[
    HEADER0,
    NAME,
    parent("parent"),
    cross("target"),
    list("children", ElementKind::ChildRef),
    field("expanded", Bool),
    after(2013, "iconState", U16),
];

const BROWSER_FOLDER: &[Field] = &[
    HEADER0,
    NAME,
    parent("parent"),
    list("children", ElementKind::ChildRef),
];

const BROWSER_ICON: &[Field] = &[HEADER0, field("iconId", U32), field("tint", Color)];

const BROWSER_FILTER: &[Field] = &[
    HEADER0,
    field("filter", Text8),
    list("hidden", ElementKind::CrossRef),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x5DD3BBFE, "BrowserRoot", Script(BROWSER_ROOT)),
        (0x7C44E2A2, "BrowserNode", Script(BROWSER_NODE)),
        (0x7C44E2A3, "BrowserFolder", Script(BROWSER_FOLDER)),
        (0x0233E9BC, "BrowserIcon", Script(BROWSER_ICON)),
        (0xB4F2B6D0, "BrowserFilter", Script(BROWSER_FILTER)),
    ])
});
