//! Graphics segment records: display meshes and their attributes.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{after, build_table, cross, field, list, Field, HandlerTable, HEADER0};
use crate::io::segment::record_reader::ElementKind;

/// Type id of a mesh part; its declared size is unreliable.
pub const MESH_PART: u32 = 0x60FD1845;

const GRAPHICS_ROOT: &[Field] = &[HEADER0, list("parts", ElementKind::ChildRef)];

const MESH_PART_FIELDS: &[Field] = &[HEADER0, cross("body"), field("faceCount", U32)];

const GRAPHICS_ATTRIBUTES: &[Field] = &[
    HEADER0,
    field("color", Color),
    field("transparency", F32),
    field("lineType", U16),
    after(2014, "lineWeight", F32),
];

const LINE_STYLE: &[Field] = &[
    HEADER0,
    field("pattern", U32Array(4)),
    field("scale", F64),
];

const TEXTURE_COORDINATES: &[Field] = &[HEADER0, list("uv", ElementKind::F32x2)];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x5194E9A4, "GraphicsRoot", Script(GRAPHICS_ROOT)),
        (MESH_PART, "MeshPart", Script(MESH_PART_FIELDS)),
        (0x9795E56A, "GraphicsAttributes", Script(GRAPHICS_ATTRIBUTES)),
        (0xAF48560F, "LineStyle", Script(LINE_STYLE)),
        (0x3D953EB2, "TextureCoordinates", Script(TEXTURE_COORDINATES)),
    ])
});
