//! B-Rep segment records. Geometry blobs are kept opaque.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::{Custom, Script};
use super::{after, build_table, child, cross, field, list, Field, HandlerTable, CONTENT, HEADER0, NAME};
use crate::error::Result;
use crate::io::segment::record_reader::{ElementKind, RecordReader};
use crate::model::node::Node;
use crate::model::value::Value;

/// Type id of the SAT entity blob; its declared size is unreliable.
pub const ACIS_ENTITY_DATA: u32 = 0xB292C2F5;

const BREP_OWNER: &[Field] = &[
    CONTENT,
    list("bodies", ElementKind::ChildRef),
    after(2012, "version", U32),
];

const BREP_BODY: &[Field] = &[
    CONTENT,
    NAME,
    field("transformation", CodedFloat),
    child("data"),
    list("faces", ElementKind::ChildRef),
];

const BREP_FACE: &[Field] = &[
    HEADER0,
    cross("body"),
    field("faceIndex", U32),
    field("color", Color),
];

const BREP_EDGE: &[Field] = &[
    HEADER0,
    cross("body"),
    field("edgeIndex", U32),
    list("faces", ElementKind::CrossRef),
];

const BREP_ATTRIBUTES: &[Field] = &[
    HEADER0,
    cross("body"),
    list("bounds", ElementKind::F64x3),
    list("tags", ElementKind::I32x2),
];

/// SAT blob: `u32 version`, `u32 length`, raw bytes.
fn read_acis_entity_data(r: &mut RecordReader<'_>, node: &mut Node) -> Result<()> {
    r.header0(node)?;
    let version = r.cursor().read_u32()?;
    r.bind(node, "satVersion", Value::U32(version))?;
    let len = r.cursor().read_u32()? as usize;
    let sat = r.cursor().read_bytes(len)?.to_vec();
    r.bind(node, "sat", Value::Bytes(sat))
}

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0xCA7163A3, "BRepOwner", Script(BREP_OWNER)),
        (0x26287E96, "BRepBody", Script(BREP_BODY)),
        (0x8EB19F04, "BRepFace", Script(BREP_FACE)),
        (0x8EB19F05, "BRepEdge", Script(BREP_EDGE)),
        (0x1A26E4F9, "BRepAttributes", Script(BREP_ATTRIBUTES)),
        (ACIS_ENTITY_DATA, "AcisEntityData", Custom(read_acis_entity_data)),
    ])
});
