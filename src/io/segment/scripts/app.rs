//! Application segment records: document-wide settings.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, field, list, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::ElementKind;

const APP_ROOT: &[Field] = &[
    HEADER0,
    NAME,
    list("settings", ElementKind::ChildRef),
    after(2014, "templates", List(ElementKind::Text16)),
];

const DISPLAY_SETTINGS: &[Field] = &[
    field("flags", U32),
    after(2011, "displayStyle", U32),
    after(2011, "edgeMode", U32),
];

const COLOR_SCHEME: &[Field] = &[
    HEADER0,
    NAME,
    field("background", Color),
    field("foreground", Color),
    field("highlight", Color),
    after(2015, "gradient", Bool),
];

const LENGTH_UNITS: &[Field] = &[HEADER0, field("unit", U32), field("precision", U16)];

const ANGLE_UNITS: &[Field] = &[
    HEADER0,
    field("unit", U32),
    field("precision", U16),
    after(2012, "radians", Bool),
];

const MASS_PROPERTIES: &[Field] = &[
    HEADER0,
    field("mass", F64),
    field("area", F64),
    field("volume", F64),
    field("centerOfGravity", F64Array(3)),
    after(2014, "inertia", F64Array(6)),
    field("updated", DateTime),
];

const MATERIAL: &[Field] = &[
    HEADER0,
    NAME,
    field("diffuse", Color),
    field("specular", Color),
    field("density", F64),
    after(2013, "library", Text16),
];

const LIGHTING: &[Field] = &[
    HEADER0,
    NAME,
    field("ambient", Color),
    field("direction", F32Array(3)),
    field("intensity", F32),
];

const MODELING_SETTINGS: &[Field] = &[
    HEADER0,
    field("tolerance", F64),
    field("compactModel", Bool),
    after(2016, "defaultTemplate", Text8),
];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x442F0FBE, "AppRoot", Script(APP_ROOT)),
        (0x4D36D4F9, "DisplaySettings", Script(DISPLAY_SETTINGS)),
        (0x9B043321, "ColorScheme", Script(COLOR_SCHEME)),
        (0x5194E9A2, "LengthUnits", Script(LENGTH_UNITS)),
        (0x5194E9A3, "AngleUnits", Script(ANGLE_UNITS)),
        (0x0B86AC90, "MassProperties", Script(MASS_PROPERTIES)),
        (0xE9EE5DE3, "Material", Script(MATERIAL)),
        (0x9360CF4D, "Lighting", Script(LIGHTING)),
        (0x7F4C05BD, "ModelingSettings", Script(MODELING_SETTINGS)),
    ])
});
