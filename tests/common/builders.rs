//! Byte builders for segment streams and record payloads.
//!
//! [`SegmentBuilder`] lays out a preamble, the block-size table and the
//! decompressed block bodies, then zlib-compresses the body and splits the
//! compressed stream between the `M` (metadata) and `B` (binary) streams.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use invrust::io::segment::TERMINATOR;
use invrust::types::{FormatVersion, Uuid};

/// Full type UUID whose truncated form is `short`.
pub fn type_uuid(short: u32) -> Uuid {
    Uuid::from_fields(short, 0x11D1, 0x4B9F, &[0x80, 0x00, 0x00, 0xAA, 0x00, 0xB3, 0xD9, 0xD1])
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn text8_bytes(s: &str) -> Vec<u8> {
    let mut out = (s.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn text16_bytes(s: &str) -> Vec<u8> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let mut out = (units.len() as u32).to_le_bytes().to_vec();
    for u in units {
        out.extend_from_slice(&u.to_le_bytes());
    }
    out
}

enum Block {
    Record {
        tag: u8,
        payload: Vec<u8>,
        declared: u32,
        marker: u32,
    },
    Aux { payload: Vec<u8> },
}

/// Builds the `M`/`B` stream pair of one segment.
pub struct SegmentBuilder {
    version: u32,
    name: String,
    types: Vec<Uuid>,
    blocks: Vec<Block>,
    terminator: Uuid,
    trailing: Vec<u8>,
}

impl SegmentBuilder {
    pub fn new(name: &str, version: u32) -> Self {
        Self {
            version,
            name: name.to_string(),
            types: Vec::new(),
            blocks: Vec::new(),
            terminator: TERMINATOR,
            trailing: Vec::new(),
        }
    }

    /// Register a type and return its local tag.
    pub fn type_tag(&mut self, short: u32) -> u8 {
        let id = type_uuid(short);
        if let Some(pos) = self.types.iter().position(|t| *t == id) {
            return pos as u8;
        }
        self.types.push(id);
        (self.types.len() - 1) as u8
    }

    /// Append a record block of type `short`.
    pub fn record(self, short: u32, payload: Vec<u8>) -> Self {
        let marker = payload.len() as u32;
        self.record_overrun(short, payload, marker, marker)
    }

    /// Append a record block with a raw tag.
    pub fn record_tagged(mut self, tag: u8, payload: Vec<u8>) -> Self {
        let marker = payload.len() as u32;
        self.blocks.push(Block::Record {
            tag,
            payload,
            declared: marker,
            marker,
        });
        self
    }

    /// Append a record block whose trailing size marker is `marker`.
    pub fn record_with_marker(self, short: u32, payload: Vec<u8>, marker: u32) -> Self {
        let declared = payload.len() as u32;
        self.record_overrun(short, payload, declared, marker)
    }

    /// Append a record block whose block-size entry says `declared`
    /// whatever the payload length.
    pub fn record_overrun(mut self, short: u32, payload: Vec<u8>, declared: u32, marker: u32) -> Self {
        let tag = self.type_tag(short);
        self.blocks.push(Block::Record {
            tag,
            payload,
            declared,
            marker,
        });
        self
    }

    /// Append an auxiliary block.
    pub fn aux(mut self, payload: Vec<u8>) -> Self {
        self.blocks.push(Block::Aux { payload });
        self
    }

    pub fn terminator(mut self, terminator: Uuid) -> Self {
        self.terminator = terminator;
        self
    }

    /// Bytes appended after the terminator.
    pub fn trailing(mut self, bytes: &[u8]) -> Self {
        self.trailing.extend_from_slice(bytes);
        self
    }

    fn trailer_len(&self) -> usize {
        FormatVersion::new(self.version).block_trailer_len()
    }

    /// Declared length of each block, as written to the block-size table.
    fn declared(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Record { declared, .. } => declared | 0x8000_0000,
                Block::Aux { payload } => payload.len() as u32,
            })
            .collect()
    }

    /// Decompressed segment body.
    pub fn body(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Record {
                    tag,
                    payload,
                    marker,
                    ..
                } => {
                    out.push(*tag);
                    out.extend_from_slice(payload);
                    out.extend_from_slice(&marker.to_le_bytes());
                }
                Block::Aux { payload } => {
                    out.extend_from_slice(payload);
                    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                }
            }
            out.extend(std::iter::repeat(0u8).take(self.trailer_len()));
        }
        out.extend_from_slice(&self.terminator.to_bytes_le());
        out.extend_from_slice(&self.trailing);
        out
    }

    /// Preamble up to and including the payload marker.
    pub fn preamble(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend(text8_bytes(&self.name));
        out.push(0);
        out.extend(text16_bytes(""));
        out.extend(text16_bytes(""));
        out.extend_from_slice(&(self.types.len() as u32).to_le_bytes());
        for t in &self.types {
            out.extend_from_slice(&t.to_bytes_le());
        }
        out.extend_from_slice(&0u32.to_le_bytes());
        let declared = self.declared();
        out.extend_from_slice(&(declared.len() as u32).to_le_bytes());
        for word in declared {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.push(0x01);
        out
    }

    /// `(M stream, B stream)`: the compressed body is split between them.
    pub fn build(&self) -> (Vec<u8>, Vec<u8>) {
        let packed = zlib(&self.body());
        let split = packed.len() / 2;
        let mut meta = self.preamble();
        meta.extend_from_slice(&packed[..split]);
        (meta, packed[split..].to_vec())
    }
}

/// Record payload writer.
#[derive(Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// `u32 hdr0`, `u16 hdr1` (no padding from 2011 on).
    pub fn header0(self) -> Self {
        self.u32(0).u16(0)
    }

    /// Content header with null label and parent references.
    pub fn content_header(self) -> Self {
        self.header0().node_ref(0).u32(0).node_ref(0).u32(0)
    }

    /// 2D constraint header with a null sketch, not driving.
    pub fn constraint_header_2d(self) -> Self {
        self.content_header().u32(0).node_ref(0).u8(0)
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn text16(mut self, s: &str) -> Self {
        self.0.extend(text16_bytes(s));
        self
    }

    /// `[u16 low][u16 high]` for `index`.
    pub fn node_ref(self, index: u32) -> Self {
        self.u16((index & 0xFFFF) as u16).u16(((index >> 16) & 0x7FFF) as u16)
    }

    /// Sequence list of references.
    pub fn ref_list(self, indices: &[u32]) -> Self {
        let mut out = self.u16(0x0002).u16(0x3000).u32(indices.len() as u32).u32(0).u32(0);
        for &index in indices {
            out = out.node_ref(index);
        }
        out
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Document streams
// ---------------------------------------------------------------------------

/// `RSeStorage/RSeDb` for directory layout `version`.
pub fn rse_db(version: u32) -> Vec<u8> {
    let mut out = Uuid::from_u128(0x5EED).to_bytes_le().to_vec();
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&132_000_000_000_000_000u64.to_le_bytes());
    out.extend_from_slice(&Uuid::from_u128(0xD0C).to_bytes_le());
    out
}

/// `RSeStorage/RSeSegInfo` listing `names` in layout `version`.
pub fn rse_seg_info(names: &[&str], version: u32) -> Vec<u8> {
    let mut out = (names.len() as u32).to_le_bytes().to_vec();
    for (i, name) in names.iter().enumerate() {
        out.extend(text16_bytes(name));
        out.extend_from_slice(&Uuid::from_u128(i as u128 + 1).to_bytes_le());
        if version >= 0x15 {
            out.extend_from_slice(&Uuid::from_u128(0x7E).to_bytes_le());
        }
        if version >= 0x1A {
            out.extend_from_slice(&0u32.to_le_bytes());
        }
        if version == 0x1D {
            out.extend_from_slice(&2u32.to_le_bytes());
            out.extend_from_slice(&[0xAB, 0xCD]);
        }
        if version >= 0x1F {
            out.extend_from_slice(&(i as u32 + 10).to_le_bytes());
        }
    }
    out
}

/// `UFRxDoc` fingerprint.
pub fn ufrx_doc(release: u32, application: &str) -> Vec<u8> {
    let mut out = 5u32.to_le_bytes().to_vec();
    out.extend_from_slice(&release.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend(text16_bytes(application));
    out
}

/// `Protein` stream wrapping `payload`.
pub fn protein(payload: &[u8]) -> Vec<u8> {
    let mut out = (payload.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(payload);
    out
}

/// One-section property set holding 8-bit string properties.
pub fn property_set(strings: &[(u32, &str)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xFFFEu16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out.extend_from_slice(&48u32.to_le_bytes());

    let header_len = 8 + strings.len() * 8;
    let mut body = Vec::new();
    let mut slots = Vec::new();
    for (id, s) in strings {
        slots.push((*id, (header_len + body.len()) as u32));
        body.extend_from_slice(&0x1Eu32.to_le_bytes());
        body.extend_from_slice(&(s.len() as u32 + 1).to_le_bytes());
        body.extend_from_slice(s.as_bytes());
        body.push(0);
    }
    out.extend_from_slice(&((header_len + body.len()) as u32).to_le_bytes());
    out.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    for (id, offset) in slots {
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
    }
    out.extend(body);
    out
}
