//! Record reader: the compound read operations every record is built from.
//!
//! A [`RecordReader`] wraps the cursor over one record's payload together
//! with the decoding context of its segment (format version, attribute
//! strictness). Record handlers call its operations and bind the results
//! into the node's attribute map.

use crate::error::{InvError, Result};
use crate::io::cursor::ByteCursor;
use crate::io::segment::coded_float::CodedFloat;
use crate::model::node::Node;
use crate::model::node_ref::{NodeRef, RefKind};
use crate::model::value::{
    FontInfo, ListShape, ListValue, MapKey, MapValue, NumericArray, TextEncoding, Value,
};
use crate::types::FormatVersion;

/// High half of every list magic.
pub const LIST_MAGIC: u16 = 0x3000;

/// Element type of a list, declared by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    U32,
    U16x2,
    U16x3,
    I32x2,
    F32x2,
    F32x3,
    F64,
    F64x2,
    F64x3,
    ChildRef,
    CrossRef,
    ParentRef,
    Text16,
    Font,
}

/// Key type of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    U32,
    U16,
    Uuid,
    Text8,
    Text16,
}

/// Value type of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapValueKind {
    ChildRef,
    CrossRef,
    U32,
    F64,
    List(ElementKind),
}

/// Cursor plus decoding context for one record.
pub struct RecordReader<'a> {
    cursor: ByteCursor<'a>,
    version: FormatVersion,
    strict: bool,
    rebinds: Vec<&'static str>,
}

impl<'a> RecordReader<'a> {
    /// Create a reader over `payload`, which starts at `base` in the
    /// decompressed segment buffer.
    pub fn new(payload: &'a [u8], base: usize, version: FormatVersion, strict: bool) -> Self {
        Self {
            cursor: ByteCursor::with_base(payload, base),
            version,
            strict,
            rebinds: Vec::new(),
        }
    }

    /// Underlying cursor, for primitive reads.
    pub fn cursor(&mut self) -> &mut ByteCursor<'a> {
        &mut self.cursor
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Attribute names bound twice in lenient mode.
    pub fn rebinds(&self) -> &[&'static str] {
        &self.rebinds
    }

    /// Bytes not consumed by the record handler, if any.
    pub fn take_residual(&mut self) -> Option<Vec<u8>> {
        if self.cursor.at_end() {
            None
        } else {
            Some(self.cursor.read_rest().to_vec())
        }
    }

    // ---------------------------------------------------------------
    // Binding
    // ---------------------------------------------------------------

    /// Bind an attribute. A second bind of the same name fails the record
    /// in strict mode; otherwise it is remembered and the new value wins.
    pub fn bind(&mut self, node: &mut Node, name: &'static str, value: Value) -> Result<()> {
        if node.attributes.insert(name, value).is_some() {
            if self.strict {
                return Err(InvError::AttributeRebind {
                    node: node.index,
                    name: name.to_string(),
                });
            }
            self.rebinds.push(name);
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Header variants
    // ---------------------------------------------------------------

    /// Skip `n` padding bytes, present only before 2011.
    pub fn skip_block_size(&mut self, n: usize) -> Result<()> {
        if self.version.pads_blocks() {
            self.cursor.skip(n)?;
        }
        Ok(())
    }

    /// `u32 hdr0`, `u16 hdr1`, padding.
    pub fn header0(&mut self, node: &mut Node) -> Result<()> {
        let hdr0 = self.cursor.read_u32()?;
        let hdr1 = self.cursor.read_u16()?;
        self.bind(node, "hdr0", Value::U32(hdr0))?;
        self.bind(node, "hdr1", Value::U16(hdr1))?;
        self.skip_block_size(4)
    }

    /// Header0, child `label`, `u32 flags`, padding, parent `parent`,
    /// `u32 index`.
    pub fn content_header(&mut self, node: &mut Node) -> Result<()> {
        self.header0(node)?;
        let label = self.read_node_ref(RefKind::Child)?;
        self.bind(node, "label", Value::Ref(label))?;
        let flags = self.cursor.read_u32()?;
        self.bind(node, "flags", Value::U32(flags))?;
        self.skip_block_size(4)?;
        let parent = self.read_node_ref(RefKind::Parent)?;
        self.bind(node, "parent", Value::Ref(parent))?;
        let index = self.cursor.read_u32()?;
        self.bind(node, "index", Value::U32(index))
    }

    /// Content header of a 2D geometric constraint.
    pub fn constraint_header_2d(&mut self, node: &mut Node) -> Result<()> {
        self.content_header(node)?;
        let flags = self.cursor.read_u32()?;
        self.bind(node, "constraintFlags", Value::U32(flags))?;
        let sketch = self.read_node_ref(RefKind::Cross)?;
        self.bind(node, "sketch", Value::Ref(sketch))?;
        let driving = self.cursor.read_bool()?;
        self.bind(node, "driving", Value::Bool(driving))
    }

    /// Content header of a 3D geometric constraint.
    pub fn constraint_header_3d(&mut self, node: &mut Node) -> Result<()> {
        self.content_header(node)?;
        let flags = self.cursor.read_u32()?;
        self.bind(node, "constraintFlags", Value::U32(flags))?;
        let sketch = self.read_node_ref(RefKind::Cross)?;
        self.bind(node, "sketch3D", Value::Ref(sketch))?;
        if self.version.after(2010) {
            let state = self.cursor.read_u32()?;
            self.bind(node, "solverState", Value::U32(state))?;
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // References and coded values
    // ---------------------------------------------------------------

    /// `[u16 low][u16 high]`.
    pub fn read_node_ref(&mut self, kind: RefKind) -> Result<NodeRef> {
        let low = self.cursor.read_u16()?;
        let high = self.cursor.read_u16()?;
        Ok(NodeRef::from_raw(low, high, kind))
    }

    pub fn read_coded_float(&mut self) -> Result<CodedFloat> {
        CodedFloat::read(&mut self.cursor)
    }

    /// `u32 style`, `u16 weight`, `u8 italic`, `u8 underline`, `f32 size`,
    /// UTF-16 name.
    pub fn read_font(&mut self) -> Result<FontInfo> {
        let style = self.cursor.read_u32()?;
        let weight = self.cursor.read_u16()?;
        let italic = self.cursor.read_bool()?;
        let underline = self.cursor.read_bool()?;
        let size = self.cursor.read_f32()?;
        let name = self.cursor.read_text16()?;
        Ok(FontInfo {
            style,
            weight,
            italic,
            underline,
            size,
            name,
        })
    }

    // ---------------------------------------------------------------
    // Lists and maps
    // ---------------------------------------------------------------

    /// Read the list framing `[u16 shape][u16 0x3000][u32 count][u32][u32]`.
    ///
    /// From 2015 on, empty lists may be preceded by zero words; they are
    /// consumed here.
    fn read_list_header(&mut self, want_map: bool) -> Result<(ListShape, usize)> {
        if self.version.has_list_padding() {
            while self.cursor.remaining() >= 4 && self.cursor.peek_u32()? == 0 {
                self.cursor.skip(4)?;
            }
        }
        let offset = self.cursor.absolute_position();
        let code = self.cursor.read_u16()?;
        let magic = self.cursor.read_u16()?;
        let shape = ListShape::from_code(code)
            .filter(|shape| shape.is_map() == want_map)
            .filter(|_| magic == LIST_MAGIC)
            .ok_or_else(|| {
                InvError::MalformedRecord(format!(
                    "unexpected {} magic [{code:04X},{magic:04X}] at {offset:#X}",
                    if want_map { "map" } else { "list" }
                ))
            })?;
        let count = self.cursor.read_u32()? as usize;
        self.cursor.skip(8)?;
        Ok((shape, count))
    }

    /// Read a list of `element` values.
    pub fn read_list(&mut self, element: ElementKind) -> Result<ListValue> {
        let (shape, count) = self.read_list_header(false)?;
        let mut items = Vec::with_capacity(count.min(self.cursor.remaining()));
        for position in 0..count {
            items.push(self.read_element(element, position as u32)?);
        }
        Ok(ListValue { shape, items })
    }

    /// Read a map of `key` → `value` pairs. Duplicate keys overwrite.
    pub fn read_map(&mut self, key: KeyKind, value: MapValueKind) -> Result<MapValue> {
        let (shape, count) = self.read_list_header(true)?;
        let mut map = MapValue {
            shape,
            entries: Default::default(),
        };
        for position in 0..count {
            let k = self.read_key(key)?;
            let v = match value {
                MapValueKind::ChildRef => self.read_element(ElementKind::ChildRef, position as u32)?,
                MapValueKind::CrossRef => self.read_element(ElementKind::CrossRef, position as u32)?,
                MapValueKind::U32 => Value::U32(self.cursor.read_u32()?),
                MapValueKind::F64 => Value::F64(self.cursor.read_f64()?),
                MapValueKind::List(element) => Value::List(self.read_list(element)?),
            };
            map.entries.insert(k, v);
        }
        Ok(map)
    }

    fn read_key(&mut self, key: KeyKind) -> Result<MapKey> {
        Ok(match key {
            KeyKind::U32 => MapKey::U32(self.cursor.read_u32()?),
            KeyKind::U16 => MapKey::U16(self.cursor.read_u16()?),
            KeyKind::Uuid => MapKey::Uuid(self.cursor.read_uuid()?),
            KeyKind::Text8 => MapKey::Text(self.cursor.read_text8()?),
            KeyKind::Text16 => MapKey::Text(self.cursor.read_text16()?),
        })
    }

    fn read_element(&mut self, element: ElementKind, position: u32) -> Result<Value> {
        Ok(match element {
            ElementKind::U32 => Value::U32(self.cursor.read_u32()?),
            ElementKind::U16x2 => Value::Array(NumericArray::U16(self.cursor.read_u16_array(2)?)),
            ElementKind::U16x3 => Value::Array(NumericArray::U16(self.cursor.read_u16_array(3)?)),
            ElementKind::I32x2 => Value::Array(NumericArray::I32(self.cursor.read_i32_array(2)?)),
            ElementKind::F32x2 => Value::Array(NumericArray::F32(self.cursor.read_f32_array(2)?)),
            ElementKind::F32x3 => Value::Array(NumericArray::F32(self.cursor.read_f32_array(3)?)),
            ElementKind::F64 => Value::F64(self.cursor.read_f64()?),
            ElementKind::F64x2 => Value::Array(NumericArray::F64(self.cursor.read_f64_array(2)?)),
            ElementKind::F64x3 => Value::Array(NumericArray::F64(self.cursor.read_f64_array(3)?)),
            ElementKind::ChildRef => {
                Value::Ref(self.read_node_ref(RefKind::Child)?.with_number(position))
            }
            ElementKind::CrossRef => {
                Value::Ref(self.read_node_ref(RefKind::Cross)?.with_number(position))
            }
            ElementKind::ParentRef => {
                Value::Ref(self.read_node_ref(RefKind::Parent)?.with_number(position))
            }
            ElementKind::Text16 => Value::Text(self.cursor.read_text16()?, TextEncoding::Utf16),
            ElementKind::Font => Value::Font(self.read_font()?),
        })
    }
}
