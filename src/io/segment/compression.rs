//! Segment payload decompression.
//!
//! The zlib stream starts in the metadata stream right after the preamble
//! and continues through the whole binary stream, so both parts are fed to
//! one decoder back to back.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::{InvError, Result};

/// Trait for inflating a payload split over two buffers.
pub trait Decompressor {
    /// Inflate `head` followed by `tail` into one buffer.
    fn decompress(&self, head: &[u8], tail: &[u8]) -> Result<Vec<u8>>;
}

/// zlib (RFC 1950) payload decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibDecompressor;

impl Decompressor for ZlibDecompressor {
    fn decompress(&self, head: &[u8], tail: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = ZlibDecoder::new(head.chain(tail));
        let mut out = Vec::with_capacity((head.len() + tail.len()).saturating_mul(4));
        decoder
            .read_to_end(&mut out)
            .map_err(|e| InvError::Decompression(e.to_string()))?;
        Ok(out)
    }
}
