//! Per-flavor record handler tables.
//!
//! Most records are a fixed run of compound reads, so they are described by
//! a field script: a static slice of [`Field`] descriptors (attribute name,
//! read kind, optional version gate) interpreted by [`run_script`]. Records
//! whose layout depends on their own content get a custom reader function.
//!
//! Each flavor module exposes a `TABLE` keyed by the truncated type id.

pub mod app;
pub mod brep;
pub mod browser;
pub mod dc;
pub mod design_view;
pub mod ee_data;
pub mod ee_scene;
pub mod fb_attribute;
pub mod graphics;
pub mod notebook;
pub mod result;
pub mod sheet;

use ahash::AHashMap;

use crate::error::Result;
use crate::io::segment::record_reader::{ElementKind, KeyKind, MapValueKind, RecordReader};
use crate::model::node::Node;
use crate::model::node_ref::RefKind;
use crate::model::value::{NumericArray, TextEncoding, Value};
use crate::types::FormatVersion;

/// Version condition of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    /// Present when the segment version is greater than the year.
    After(u32),
    /// Present when the segment version is less than the year.
    Before(u32),
}

impl Gate {
    pub fn passes(&self, version: FormatVersion) -> bool {
        match self {
            Gate::Always => true,
            Gate::After(year) => version.after(*year),
            Gate::Before(year) => version.before(*year),
        }
    }
}

/// How a field is read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Header0,
    ContentHeader,
    ConstraintHeader2D,
    ConstraintHeader3D,
    /// Padding present before 2011.
    SkipBlockSize(usize),
    /// Unconditional padding.
    Pad(usize),
    U8,
    U16,
    U32,
    I16,
    I32,
    Bool,
    F32,
    F64,
    Uuid,
    Color,
    Text8,
    Text16,
    /// UTF-16 text that is also the node's label.
    Name,
    DateTime,
    U16Array(usize),
    U32Array(usize),
    I32Array(usize),
    F32Array(usize),
    F64Array(usize),
    Ref(RefKind),
    List(ElementKind),
    Map(KeyKind, MapValueKind),
    CodedFloat,
    Font,
}

/// One step of a field script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub gate: Gate,
}

pub const fn field(name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        gate: Gate::Always,
    }
}

pub const fn after(year: u32, name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        gate: Gate::After(year),
    }
}

pub const fn before(year: u32, name: &'static str, kind: FieldKind) -> Field {
    Field {
        name,
        kind,
        gate: Gate::Before(year),
    }
}

pub const fn child(name: &'static str) -> Field {
    field(name, FieldKind::Ref(RefKind::Child))
}

pub const fn cross(name: &'static str) -> Field {
    field(name, FieldKind::Ref(RefKind::Cross))
}

pub const fn parent(name: &'static str) -> Field {
    field(name, FieldKind::Ref(RefKind::Parent))
}

pub const fn list(name: &'static str, element: ElementKind) -> Field {
    field(name, FieldKind::List(element))
}

pub const fn map(name: &'static str, key: KeyKind, value: MapValueKind) -> Field {
    field(name, FieldKind::Map(key, value))
}

pub const HEADER0: Field = field("", FieldKind::Header0);
pub const CONTENT: Field = field("", FieldKind::ContentHeader);
pub const CONSTRAINT_2D: Field = field("", FieldKind::ConstraintHeader2D);
pub const CONSTRAINT_3D: Field = field("", FieldKind::ConstraintHeader3D);
pub const NAME: Field = field("name", FieldKind::Name);

/// Reader for records with content-dependent layouts.
pub type CustomReader = fn(&mut RecordReader<'_>, &mut Node) -> Result<()>;

/// How a record type is decoded.
#[derive(Clone, Copy)]
pub enum HandlerBody {
    Script(&'static [Field]),
    Custom(CustomReader),
}

/// A registered record type.
#[derive(Clone, Copy)]
pub struct RecordHandler {
    pub type_name: &'static str,
    pub body: HandlerBody,
}

impl RecordHandler {
    /// Decode the record into `node`.
    pub fn run(&self, reader: &mut RecordReader<'_>, node: &mut Node) -> Result<()> {
        match self.body {
            HandlerBody::Script(fields) => run_script(fields, reader, node),
            HandlerBody::Custom(read) => read(reader, node),
        }
    }
}

impl std::fmt::Debug for RecordHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match self.body {
            HandlerBody::Script(fields) => format!("Script({} fields)", fields.len()),
            HandlerBody::Custom(_) => "Custom".to_string(),
        };
        f.debug_struct("RecordHandler")
            .field("type_name", &self.type_name)
            .field("body", &body)
            .finish()
    }
}

/// Truncated type id → handler.
pub type HandlerTable = AHashMap<u32, RecordHandler>;

/// Build a handler table from `(type id, type name, body)` rows.
pub fn build_table(rows: &[(u32, &'static str, HandlerBody)]) -> HandlerTable {
    let mut table = HandlerTable::with_capacity(rows.len());
    for &(id, type_name, body) in rows {
        let previous = table.insert(id, RecordHandler { type_name, body });
        debug_assert!(previous.is_none(), "duplicate handler for {id:08X}");
    }
    table
}

/// Interpret a field script.
pub fn run_script(fields: &[Field], reader: &mut RecordReader<'_>, node: &mut Node) -> Result<()> {
    for f in fields {
        if f.gate.passes(reader.version()) {
            read_field(f, reader, node)?;
        }
    }
    Ok(())
}

fn read_field(f: &Field, r: &mut RecordReader<'_>, node: &mut Node) -> Result<()> {
    let value = match f.kind {
        FieldKind::Header0 => return r.header0(node),
        FieldKind::ContentHeader => return r.content_header(node),
        FieldKind::ConstraintHeader2D => return r.constraint_header_2d(node),
        FieldKind::ConstraintHeader3D => return r.constraint_header_3d(node),
        FieldKind::SkipBlockSize(n) => return r.skip_block_size(n),
        FieldKind::Pad(n) => return r.cursor().skip(n),
        FieldKind::Name => {
            let text = r.cursor().read_text16()?;
            node.name = Some(text.clone());
            Value::Text(text, TextEncoding::Utf16)
        }
        FieldKind::U8 => Value::U8(r.cursor().read_u8()?),
        FieldKind::U16 => Value::U16(r.cursor().read_u16()?),
        FieldKind::U32 => Value::U32(r.cursor().read_u32()?),
        FieldKind::I16 => Value::I16(r.cursor().read_i16()?),
        FieldKind::I32 => Value::I32(r.cursor().read_i32()?),
        FieldKind::Bool => Value::Bool(r.cursor().read_bool()?),
        FieldKind::F32 => Value::F32(r.cursor().read_f32()?),
        FieldKind::F64 => Value::F64(r.cursor().read_f64()?),
        FieldKind::Uuid => Value::Uuid(r.cursor().read_uuid()?),
        FieldKind::Color => Value::Color(r.cursor().read_color()?),
        FieldKind::Text8 => Value::Text(r.cursor().read_text8()?, TextEncoding::Latin1),
        FieldKind::Text16 => Value::Text(r.cursor().read_text16()?, TextEncoding::Utf16),
        FieldKind::DateTime => Value::DateTime(r.cursor().read_date_time()?),
        FieldKind::U16Array(n) => Value::Array(NumericArray::U16(r.cursor().read_u16_array(n)?)),
        FieldKind::U32Array(n) => Value::Array(NumericArray::U32(r.cursor().read_u32_array(n)?)),
        FieldKind::I32Array(n) => Value::Array(NumericArray::I32(r.cursor().read_i32_array(n)?)),
        FieldKind::F32Array(n) => Value::Array(NumericArray::F32(r.cursor().read_f32_array(n)?)),
        FieldKind::F64Array(n) => Value::Array(NumericArray::F64(r.cursor().read_f64_array(n)?)),
        FieldKind::Ref(kind) => Value::Ref(r.read_node_ref(kind)?),
        FieldKind::List(element) => Value::List(r.read_list(element)?),
        FieldKind::Map(key, value) => Value::Map(r.read_map(key, value)?),
        FieldKind::CodedFloat => Value::Transform(r.read_coded_float()?),
        FieldKind::Font => Value::Font(r.read_font()?),
    };
    r.bind(node, f.name, value)
}
