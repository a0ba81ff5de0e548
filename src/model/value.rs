//! Tagged attribute values.

use std::fmt;

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::io::segment::coded_float::CodedFloat;
use crate::model::node_ref::NodeRef;
use crate::types::{Color, Uuid};

/// How a text value was encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Latin1,
    Utf16,
}

/// List framing shape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListShape {
    Sequence,
    Restartable,
    Flat,
    Map,
    MapExtended,
}

impl ListShape {
    /// Parse a shape code (the low half of the list magic).
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0x0002 => Some(ListShape::Sequence),
            0x0003 => Some(ListShape::Restartable),
            0x0004 => Some(ListShape::Flat),
            0x0006 => Some(ListShape::Map),
            0x0007 => Some(ListShape::MapExtended),
            _ => None,
        }
    }

    /// Shape code as stored.
    pub fn code(&self) -> u16 {
        match self {
            ListShape::Sequence => 0x0002,
            ListShape::Restartable => 0x0003,
            ListShape::Flat => 0x0004,
            ListShape::Map => 0x0006,
            ListShape::MapExtended => 0x0007,
        }
    }

    /// Whether the shape frames key/value pairs.
    pub fn is_map(&self) -> bool {
        matches!(self, ListShape::Map | ListShape::MapExtended)
    }
}

/// Fixed-size numeric array of a single element type.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericArray {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl NumericArray {
    pub fn len(&self) -> usize {
        match self {
            NumericArray::U8(v) => v.len(),
            NumericArray::U16(v) => v.len(),
            NumericArray::U32(v) => v.len(),
            NumericArray::I32(v) => v.len(),
            NumericArray::F32(v) => v.len(),
            NumericArray::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `i` widened to `f64`.
    pub fn get_f64(&self, i: usize) -> Option<f64> {
        match self {
            NumericArray::U8(v) => v.get(i).map(|x| *x as f64),
            NumericArray::U16(v) => v.get(i).map(|x| *x as f64),
            NumericArray::U32(v) => v.get(i).map(|x| *x as f64),
            NumericArray::I32(v) => v.get(i).map(|x| *x as f64),
            NumericArray::F32(v) => v.get(i).map(|x| *x as f64),
            NumericArray::F64(v) => v.get(i).copied(),
        }
    }
}

/// Font descriptor stored in text-style lists.
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    pub style: u32,
    pub weight: u16,
    pub italic: bool,
    pub underline: bool,
    pub size: f32,
    pub name: String,
}

/// A variable-size sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ListValue {
    pub shape: ListShape,
    pub items: Vec<Value>,
}

/// Map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    U16(u16),
    U32(u32),
    Uuid(Uuid),
    Text(String),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::U16(v) => write!(f, "{v}"),
            MapKey::U32(v) => write!(f, "{v}"),
            MapKey::Uuid(v) => write!(f, "{}", v.hyphenated()),
            MapKey::Text(v) => write!(f, "'{v}'"),
        }
    }
}

/// A key/value mapping. Duplicate keys overwrite.
#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub shape: ListShape,
    pub entries: IndexMap<MapKey, Value>,
}

/// A tagged attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
    I32(i32),
    Bool(bool),
    F32(f32),
    F64(f64),
    Uuid(Uuid),
    Color(Color),
    Text(String, TextEncoding),
    DateTime(OffsetDateTime),
    Array(NumericArray),
    List(ListValue),
    Map(MapValue),
    Ref(NodeRef),
    Transform(CodedFloat),
    Font(FontInfo),
    Bytes(Vec<u8>),
}

impl Value {
    /// Integer view of scalar integer values.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::U8(v) => Some(*v as i64),
            Value::U16(v) => Some(*v as i64),
            Value::U32(v) => Some(*v as i64),
            Value::I16(v) => Some(*v as i64),
            Value::I32(v) => Some(*v as i64),
            Value::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Floating view of numeric scalar values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F32(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s, _) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_node_ref(&self) -> Option<&NodeRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&NumericArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Visit every reference held by this value, descending into lists and
    /// maps.
    pub fn for_each_ref<F: FnMut(&NodeRef)>(&self, f: &mut F) {
        match self {
            Value::Ref(r) => f(r),
            Value::List(list) => list.items.iter().for_each(|v| v.for_each_ref(f)),
            Value::Map(map) => map.entries.values().for_each(|v| v.for_each_ref(f)),
            _ => {}
        }
    }

    /// Mutable counterpart of [`Value::for_each_ref`].
    pub fn for_each_ref_mut<F: FnMut(&mut NodeRef)>(&mut self, f: &mut F) {
        match self {
            Value::Ref(r) => f(r),
            Value::List(list) => list.items.iter_mut().for_each(|v| v.for_each_ref_mut(f)),
            Value::Map(map) => map
                .entries
                .values_mut()
                .for_each(|v| v.for_each_ref_mut(f)),
            _ => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v:04X}"),
            Value::U32(v) => write!(f, "{v:08X}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Uuid(v) => write!(f, "{}", v.hyphenated()),
            Value::Color(v) => write!(f, "{v}"),
            Value::Text(v, _) => write!(f, "'{v}'"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Array(a) => {
                let parts: Vec<String> = (0..a.len())
                    .filter_map(|i| a.get_f64(i))
                    .map(|x| format!("{x}"))
                    .collect();
                write!(f, "({})", parts.join(", "))
            }
            Value::List(l) => {
                let parts: Vec<String> = l.items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Map(m) => {
                let parts: Vec<String> = m
                    .entries
                    .iter()
                    .map(|(k, v)| format!("{k}: {v}"))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Ref(r) => write!(f, "{r}"),
            Value::Transform(t) => write!(f, "{t}"),
            Value::Font(font) => write!(f, "font '{}' {}", font.name, font.size),
            Value::Bytes(b) => {
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}
