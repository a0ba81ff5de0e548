//! EE-scene segment records: scene graph nodes and styles.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, cross, field, list, parent, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::ElementKind;

const EE_SCENE_ROOT: &[Field] = &[HEADER0, list("nodes", ElementKind::ChildRef)];

const EE_SCENE_NODE: &[Field] = &[
    HEADER0,
    parent("parent"),
    field("transformation", CodedFloat),
    field("color", Color),
    list("geometry", ElementKind::CrossRef),
    cross("style"),
];

const EE_SCENE_STYLE: &[Field] = &[
    HEADER0,
    NAME,
    field("edgeColor", Color),
    field("lineWidth", F32),
    after(2016, "silhouette", Bool),
];

const EE_SCENE_POLYLINE: &[Field] = &[
    HEADER0,
    list("points", ElementKind::F32x3),
    list("segments", ElementKind::U16x2),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x1B16984A, "EeSceneRoot", Script(EE_SCENE_ROOT)),
        (0x1B16984B, "EeSceneNode", Script(EE_SCENE_NODE)),
        (0x1B16984C, "EeSceneStyle", Script(EE_SCENE_STYLE)),
        (0x1B16984D, "EeScenePolyline", Script(EE_SCENE_POLYLINE)),
    ])
});
