//! Property-set streams (`\x05SummaryInformation`,
//! `\x05DocumentSummaryInformation`).
//!
//! Only the first section of each stream is read, and only string,
//! integer and FILETIME properties are decoded; other value types are
//! skipped.

use encoding_rs::Encoding;
use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::error::{InvError, Result};
use crate::io::cursor::{filetime_to_date_time, ByteCursor};
use crate::model::document::DocumentInfo;

/// Stream name of the summary information property set.
pub const SUMMARY_INFORMATION: &str = "\u{5}SummaryInformation";
/// Stream name of the document summary information property set.
pub const DOCUMENT_SUMMARY_INFORMATION: &str = "\u{5}DocumentSummaryInformation";

const BYTE_ORDER: u16 = 0xFFFE;

const VT_I2: u32 = 0x02;
const VT_I4: u32 = 0x03;
const VT_LPSTR: u32 = 0x1E;
const VT_LPWSTR: u32 = 0x1F;
const VT_FILETIME: u32 = 0x40;

const PID_CODEPAGE: u32 = 0x01;

/// A decoded property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int(i32),
    Text(String),
    Time(Option<OffsetDateTime>),
}

/// Map a Windows code page number to an encoding.
///
/// Unknown code pages fall back to Windows-1252.
pub fn encoding_for_code_page(code_page: u16) -> &'static Encoding {
    match code_page {
        874 => encoding_rs::WINDOWS_874,
        932 => encoding_rs::SHIFT_JIS,
        936 => encoding_rs::GBK,
        949 => encoding_rs::EUC_KR,
        950 => encoding_rs::BIG5,
        1200 => encoding_rs::UTF_16LE,
        1250 => encoding_rs::WINDOWS_1250,
        1251 => encoding_rs::WINDOWS_1251,
        1253 => encoding_rs::WINDOWS_1253,
        1254 => encoding_rs::WINDOWS_1254,
        1255 => encoding_rs::WINDOWS_1255,
        1256 => encoding_rs::WINDOWS_1256,
        1257 => encoding_rs::WINDOWS_1257,
        1258 => encoding_rs::WINDOWS_1258,
        65001 => encoding_rs::UTF_8,
        _ => encoding_rs::WINDOWS_1252,
    }
}

/// Read the properties of the first section of a property-set stream,
/// keyed by property id.
pub fn read_properties(data: &[u8]) -> Result<IndexMap<u32, PropertyValue>> {
    let mut cursor = ByteCursor::new(data);
    let byte_order = cursor.read_u16()?;
    if byte_order != BYTE_ORDER {
        return Err(InvError::InvalidFormat(format!(
            "property set byte order {byte_order:#06X}"
        )));
    }
    cursor.skip(2 + 4 + 16)?;
    let sections = cursor.read_u32()?;
    if sections == 0 {
        return Ok(IndexMap::new());
    }
    cursor.skip(16)?;
    let section_offset = cursor.read_u32()? as usize;

    let section = data.get(section_offset..).ok_or(InvError::TruncatedInput {
        offset: section_offset,
        needed: 8,
        available: 0,
    })?;
    let mut header = ByteCursor::with_base(section, section_offset);
    let _size = header.read_u32()?;
    let count = header.read_u32()? as usize;
    let mut slots = Vec::with_capacity(count.min(header.remaining() / 8));
    for _ in 0..count {
        let id = header.read_u32()?;
        let offset = header.read_u32()? as usize;
        slots.push((id, offset));
    }

    // The code page governs every 8-bit string of the section.
    let mut encoding = encoding_rs::WINDOWS_1252;
    let mut properties = IndexMap::new();
    for (id, offset) in slots.iter().copied() {
        let Some(bytes) = section.get(offset..) else {
            continue;
        };
        let mut c = ByteCursor::with_base(bytes, section_offset + offset);
        if id == PID_CODEPAGE {
            if let Some(PropertyValue::Int(cp)) = read_value(&mut c, encoding)? {
                encoding = encoding_for_code_page(cp as u16);
            }
        }
    }
    for (id, offset) in slots {
        if id == PID_CODEPAGE {
            continue;
        }
        let Some(bytes) = section.get(offset..) else {
            continue;
        };
        let mut c = ByteCursor::with_base(bytes, section_offset + offset);
        if let Some(value) = read_value(&mut c, encoding)? {
            properties.insert(id, value);
        }
    }
    Ok(properties)
}

fn read_value(c: &mut ByteCursor<'_>, encoding: &'static Encoding) -> Result<Option<PropertyValue>> {
    let vt = c.read_u32()?;
    Ok(match vt {
        VT_I2 => Some(PropertyValue::Int(c.read_i16()? as i32)),
        VT_I4 => Some(PropertyValue::Int(c.read_i32()?)),
        VT_LPSTR => {
            let len = c.read_u32()? as usize;
            let bytes = c.read_bytes(len)?;
            let (text, _, _) = encoding.decode(bytes);
            Some(PropertyValue::Text(text.trim_end_matches('\0').to_string()))
        }
        VT_LPWSTR => {
            let text = c.read_text16()?;
            Some(PropertyValue::Text(text.trim_end_matches('\0').to_string()))
        }
        VT_FILETIME => {
            let ticks = c.read_u64()?;
            Some(PropertyValue::Time(
                (ticks != 0).then(|| filetime_to_date_time(ticks)).flatten(),
            ))
        }
        _ => None,
    })
}

fn text(properties: &IndexMap<u32, PropertyValue>, id: u32) -> Option<String> {
    match properties.get(&id) {
        Some(PropertyValue::Text(s)) => Some(s.clone()),
        _ => None,
    }
}

fn time(properties: &IndexMap<u32, PropertyValue>, id: u32) -> Option<OffsetDateTime> {
    match properties.get(&id) {
        Some(PropertyValue::Time(t)) => *t,
        _ => None,
    }
}

/// Fill `info` from a `\x05SummaryInformation` stream.
pub fn read_summary_information(data: &[u8], info: &mut DocumentInfo) -> Result<()> {
    let properties = read_properties(data)?;
    let fields: [(u32, &mut String); 7] = [
        (0x02, &mut info.title),
        (0x03, &mut info.subject),
        (0x04, &mut info.author),
        (0x05, &mut info.keywords),
        (0x06, &mut info.comments),
        (0x08, &mut info.last_modified_by),
        (0x12, &mut info.created_by),
    ];
    for (id, slot) in fields {
        if let Some(value) = text(&properties, id) {
            *slot = value;
        }
    }
    info.created = time(&properties, 0x0C).or(info.created);
    info.modified = time(&properties, 0x0D).or(info.modified);
    Ok(())
}

/// Fill `info` from a `\x05DocumentSummaryInformation` stream.
pub fn read_document_summary_information(data: &[u8], info: &mut DocumentInfo) -> Result<()> {
    let properties = read_properties(data)?;
    for (id, value) in properties {
        match (id, value) {
            (0x0F, PropertyValue::Text(company)) => info.company = company,
            (id, PropertyValue::Text(text)) => {
                info.properties.insert(format!("{id:#04X}"), text);
            }
            _ => {}
        }
    }
    Ok(())
}
