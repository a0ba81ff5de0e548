//! Bounds-checked little-endian primitive readers.
//!
//! A [`ByteCursor`] wraps a borrowed byte slice and a read position. Every
//! read advances the position by the number of bytes consumed, or fails with
//! [`InvError::TruncatedInput`] and leaves the position untouched.

use byteorder::{ByteOrder, LittleEndian};
use time::OffsetDateTime;

use crate::error::{InvError, Result};
use crate::types::{Color, Uuid};

/// FILETIME ticks (100 ns) between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_EPOCH: i128 = 116_444_736_000_000_000;

/// Read cursor over an immutable byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    /// Absolute offset of `data[0]` in the enclosing buffer.
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, base: 0 }
    }

    /// Create a cursor over a slice that starts at `base` in a larger buffer.
    ///
    /// Error offsets are reported relative to that larger buffer.
    pub fn with_base(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    /// Current position relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Current position in the enclosing buffer.
    pub fn absolute_position(&self) -> usize {
        self.base + self.pos
    }

    /// Move to an absolute position within the slice.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.truncated(pos - self.pos));
        }
        self.pos = pos;
        Ok(())
    }

    /// Total length of the slice.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the slice is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether every byte has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// The unread part of the slice, without advancing.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// The whole underlying slice.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    fn truncated(&self, needed: usize) -> InvError {
        InvError::TruncatedInput {
            offset: self.absolute_position(),
            needed,
            available: self.remaining(),
        }
    }

    /// Take `n` bytes and advance.
    #[inline]
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Look at the next `n` bytes without advancing.
    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.truncated(n));
        }
        Ok(&self.data[self.pos..self.pos + n])
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Take every remaining byte.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.pos..];
        self.pos = self.data.len();
        rest
    }

    // ---------------------------------------------------------------
    // Scalars
    // ---------------------------------------------------------------

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    #[inline]
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.read_bytes(8)?))
    }

    /// Peek the next `u32` without advancing.
    pub fn peek_u32(&self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.peek_bytes(4)?))
    }

    /// Read a one-byte boolean (any non-zero value is true).
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a 16-byte UUID stored in Windows GUID layout.
    pub fn read_uuid(&mut self) -> Result<Uuid> {
        let bytes = self.read_bytes(16)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Uuid::from_bytes_le(raw))
    }

    /// Read an RGBA color (four bytes in R, G, B, A order).
    pub fn read_color(&mut self) -> Result<Color> {
        let bytes = self.read_bytes(4)?;
        Ok(Color::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    }

    // ---------------------------------------------------------------
    // Fixed arrays
    // ---------------------------------------------------------------

    fn array_len(&self, n: usize, width: usize) -> Result<usize> {
        n.checked_mul(width).ok_or_else(|| self.truncated(usize::MAX))
    }

    pub fn read_u16_array(&mut self, n: usize) -> Result<Vec<u16>> {
        let len = self.array_len(n, 2)?;
        let bytes = self.read_bytes(len)?;
        let mut out = vec![0u16; n];
        LittleEndian::read_u16_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_u32_array(&mut self, n: usize) -> Result<Vec<u32>> {
        let len = self.array_len(n, 4)?;
        let bytes = self.read_bytes(len)?;
        let mut out = vec![0u32; n];
        LittleEndian::read_u32_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_i32_array(&mut self, n: usize) -> Result<Vec<i32>> {
        let len = self.array_len(n, 4)?;
        let bytes = self.read_bytes(len)?;
        let mut out = vec![0i32; n];
        LittleEndian::read_i32_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_f32_array(&mut self, n: usize) -> Result<Vec<f32>> {
        let len = self.array_len(n, 4)?;
        let bytes = self.read_bytes(len)?;
        let mut out = vec![0f32; n];
        LittleEndian::read_f32_into(bytes, &mut out);
        Ok(out)
    }

    pub fn read_f64_array(&mut self, n: usize) -> Result<Vec<f64>> {
        let len = self.array_len(n, 8)?;
        let bytes = self.read_bytes(len)?;
        let mut out = vec![0f64; n];
        LittleEndian::read_f64_into(bytes, &mut out);
        Ok(out)
    }

    // ---------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------

    /// Read Latin-1 text: `u32` length, then one byte per character.
    pub fn read_text8(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        match self.read_bytes(len) {
            Ok(bytes) => Ok(encoding_rs::mem::decode_latin1(bytes).into_owned()),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    /// Read UTF-16LE text: `u32` code-unit count, then two bytes per unit.
    pub fn read_text16(&mut self) -> Result<String> {
        let start = self.pos;
        let len = self.read_u32()? as usize;
        let byte_len = match len.checked_mul(2) {
            Some(n) => n,
            None => {
                self.pos = start;
                return Err(self.truncated(usize::MAX));
            }
        };
        match self.read_bytes(byte_len) {
            Ok(bytes) => {
                let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
                Ok(text.into_owned())
            }
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------
    // Date / time
    // ---------------------------------------------------------------

    /// Read a Windows FILETIME (100 ns ticks since 1601-01-01 UTC).
    pub fn read_date_time(&mut self) -> Result<OffsetDateTime> {
        let offset = self.absolute_position();
        let ticks = self.read_u64()?;
        filetime_to_date_time(ticks).ok_or_else(|| {
            InvError::MalformedRecord(format!(
                "FILETIME {ticks:#X} at {offset:#X} is out of range"
            ))
        })
    }
}

/// Convert FILETIME ticks to a UTC date-time.
pub fn filetime_to_date_time(ticks: u64) -> Option<OffsetDateTime> {
    let nanos = (ticks as i128 - FILETIME_UNIX_EPOCH) * 100;
    OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_little_endian() {
        let data = [0x0A, 0x00, 0x00, 0x00, 0x34, 0x12, 0xFF];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_u32().unwrap(), 10);
        assert_eq!(c.read_u16().unwrap(), 0x1234);
        assert_eq!(c.read_i8().unwrap(), -1);
        assert!(c.at_end());
    }

    #[test]
    fn test_truncated_does_not_advance() {
        let data = [1, 2, 3];
        let mut c = ByteCursor::with_base(&data, 0x100);
        let err = c.read_u32().unwrap_err();
        match err {
            InvError::TruncatedInput {
                offset,
                needed,
                available,
            } => {
                assert_eq!(offset, 0x100);
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_text8_consumes_four_plus_len() {
        let data = [3, 0, 0, 0, b'a', 0xE9, b'c', 0xAA];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_text8().unwrap(), "aéc");
        assert_eq!(c.position(), 7);
    }

    #[test]
    fn test_text16_consumes_four_plus_two_len() {
        let data = [2, 0, 0, 0, b'h', 0, b'i', 0];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_text16().unwrap(), "hi");
        assert_eq!(c.position(), 8);
    }

    #[test]
    fn test_text16_truncated_restores_position() {
        let data = [5, 0, 0, 0, b'h', 0];
        let mut c = ByteCursor::new(&data);
        assert!(matches!(c.read_text16(), Err(InvError::TruncatedInput { .. })));
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_uuid_guid_layout() {
        let expected = Uuid::parse_str("9744e6a4-11d1-8dd8-0008-2998bedddc09").unwrap();
        let bytes = expected.to_bytes_le();
        let mut c = ByteCursor::new(&bytes);
        assert_eq!(c.read_uuid().unwrap(), expected);
    }

    #[test]
    fn test_filetime_epoch() {
        let dt = filetime_to_date_time(116_444_736_000_000_000).unwrap();
        assert_eq!(dt.unix_timestamp(), 0);
        let dt = filetime_to_date_time(0).unwrap();
        assert_eq!(dt.year(), 1601);
    }

    #[test]
    fn test_arrays() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f64.to_le_bytes());
        data.extend_from_slice(&(-2.0f64).to_le_bytes());
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_f64_array(2).unwrap(), vec![1.5, -2.0]);
        assert!(c.read_f64_array(1).is_err());
    }

    #[test]
    fn test_color_rgba() {
        let data = [10, 20, 30, 40];
        let mut c = ByteCursor::new(&data);
        assert_eq!(c.read_color().unwrap(), Color::new(10, 20, 30, 40));
    }
}
