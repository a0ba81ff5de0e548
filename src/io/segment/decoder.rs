//! Segment orchestrator: one `M`/`B` stream pair in, one node table out.
//!
//! The read pipeline is:
//!
//! 1. Parse the preamble from the metadata stream (version, name, type
//!    tables, block-size table, `0x01` marker).
//! 2. Inflate the rest of the metadata stream chained with the binary
//!    stream.
//! 3. Pick the reader flavor from the segment name.
//! 4. Walk the block-size table. Record blocks become nodes and are handed
//!    to the flavor's handler; their size markers are verified. Auxiliary
//!    blocks are skipped.
//! 5. Check the terminator UUID.
//! 6. Resolve references and, if configured, build the segment graph.
//!
//! Record-level failures are logged and leave the node in error state;
//! segment-level failures are returned as `Err` and the caller records the
//! segment as failed.

use crate::error::{InvError, Result};
use crate::graph;
use crate::io::cursor::ByteCursor;
use crate::io::reader::InventorReaderConfiguration;
use crate::io::segment::compression::{Decompressor, ZlibDecompressor};
use crate::io::segment::flavor::ReaderFlavor;
use crate::io::segment::header::{read_preamble, BlockEntry, TERMINATOR};
use crate::io::segment::record_reader::RecordReader;
use crate::io::segment::resolver;
use crate::model::node::NodeFlags;
use crate::model::segment::SegmentNodeTable;
use crate::model::value::Value;
use crate::notification::{Notification, NotificationCollection, NotificationType};
use crate::types::{FormatVersion, TypeId};

/// Size of the trailing size marker of every block.
const MARKER_LEN: usize = 4;

/// Outcome of the forward scan for a variable-size record's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanResult {
    /// The size marker was found at this offset.
    Matched(usize),
    /// The buffer ended first.
    Failed,
}

/// Scan forward from `start` for the `u32` equal to `declared`.
///
/// Used for records whose block-size entry undercounts the payload: the
/// first offset holding the declared length is taken as the record end.
pub fn scan_record_end(buffer: &[u8], start: usize, declared: u32) -> ScanResult {
    let needle = declared.to_le_bytes();
    let mut cursor = start;
    while cursor + MARKER_LEN <= buffer.len() {
        if buffer[cursor..cursor + MARKER_LEN] == needle {
            return ScanResult::Matched(cursor);
        }
        cursor += 1;
    }
    ScanResult::Failed
}

/// Decodes segments with a fixed configuration.
pub struct SegmentDecoder<'c> {
    config: &'c InventorReaderConfiguration,
    decompressor: &'c dyn Decompressor,
}

impl<'c> SegmentDecoder<'c> {
    /// Create a decoder inflating payloads with zlib.
    pub fn new(config: &'c InventorReaderConfiguration) -> Self {
        Self {
            config,
            decompressor: &ZlibDecompressor,
        }
    }

    /// Decode one segment from its metadata (`meta`) and binary (`data`)
    /// streams. `stream` is the metadata stream path, used in diagnostics.
    pub fn decode(
        &self,
        stream: &str,
        meta: &[u8],
        data: &[u8],
        notifications: &mut NotificationCollection,
    ) -> Result<SegmentNodeTable> {
        let mut cursor = ByteCursor::new(meta);
        let (header, registry) = read_preamble(&mut cursor)?;
        let buffer = self.decompressor.decompress(cursor.rest(), data)?;
        let flavor = ReaderFlavor::from_segment_name(&header.name);

        tracing::debug!(
            stream,
            segment = %header.name,
            flavor = %flavor,
            version = %header.version,
            blocks = header.blocks.len(),
            inflated = buffer.len(),
            "decoding segment"
        );

        let blocks = header.blocks.clone();
        let mut table = SegmentNodeTable::new(header, registry, flavor, stream);
        let mut walk = BlockWalk {
            config: self.config,
            buffer: &buffer,
            pos: 0,
            version: table.header.version,
            notifications,
        };

        let complete = walk.walk(&blocks, &mut table)?;
        if complete {
            walk.check_terminator(stream)?;
        }

        if flavor == ReaderFlavor::Default && !table.is_empty() {
            notifications.push(
                Notification::new(
                    NotificationType::NotImplemented,
                    format!(
                        "segment '{}' has no record decoder; {} records kept as raw bytes",
                        table.name(),
                        table.len()
                    ),
                )
                .with_stream(stream),
            );
        }

        resolver::resolve(&mut table, notifications);
        if self.config.build_graph {
            let graph = graph::build_segment_graph(&table, notifications);
            for branch in graph.branches.iter().filter(|b| b.owner.is_some()) {
                if let Some(node) = table.get_mut(branch.index) {
                    node.flags.insert(NodeFlags::HAS_OWNER);
                }
            }
            table.graph = Some(graph);
        }

        tracing::debug!(stream, nodes = table.len(), "segment decoded");
        Ok(table)
    }
}

/// State of one block-table walk over the inflated buffer.
struct BlockWalk<'a> {
    config: &'a InventorReaderConfiguration,
    buffer: &'a [u8],
    pos: usize,
    version: FormatVersion,
    notifications: &'a mut NotificationCollection,
}

impl<'a> BlockWalk<'a> {
    /// Walk every block. Returns `false` when a lost record boundary ended
    /// the walk early.
    fn walk(&mut self, blocks: &[BlockEntry], table: &mut SegmentNodeTable) -> Result<bool> {
        for (block_no, block) in blocks.iter().enumerate() {
            if block.is_record {
                if !self.record(block_no, *block, table)? {
                    return Ok(false);
                }
            } else {
                self.take(block.length as usize)?;
                self.take(MARKER_LEN + self.version.block_trailer_len())?;
            }
        }
        Ok(true)
    }

    /// Advance over `n` bytes, returning their start offset.
    fn take(&mut self, n: usize) -> Result<usize> {
        let available = self.buffer.len().saturating_sub(self.pos);
        if available < n {
            return Err(InvError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(start)
    }

    fn report(
        &mut self,
        table: &SegmentNodeTable,
        nt: NotificationType,
        error: &InvError,
        offset: usize,
        type_id: TypeId,
    ) {
        self.notifications.push(
            Notification::from_error(nt, error)
                .with_stream(table.stream.as_str())
                .at(offset)
                .for_type(type_id),
        );
    }

    /// Decode one record block into a node.
    fn record(
        &mut self,
        block_no: usize,
        block: BlockEntry,
        table: &mut SegmentNodeTable,
    ) -> Result<bool> {
        let buffer = self.buffer;
        let tag_offset = self.take(1)?;
        let tag = buffer[tag_offset];
        let start = self.pos;
        let index = table.len() as u32 + 1;
        let flavor = table.flavor;

        let (type_id, tag_error) = match table.registry.lookup(tag) {
            Ok(id) => (id, None),
            Err(e) => (TypeId::NIL, Some(e)),
        };

        let declared = block.length as usize;
        let mut variable = false;
        let end = if tag_error.is_none() && flavor.is_variable_size(type_id) {
            variable = true;
            match scan_record_end(buffer, (start + declared).min(buffer.len()), block.length) {
                ScanResult::Matched(end) => end,
                ScanResult::Failed => {
                    let error = InvError::MalformedRecord(format!(
                        "no size marker {declared} after variable-size record at {start:#X}"
                    ));
                    let mut node = flavor.create_node(index, type_id, start, buffer[start..].to_vec());
                    node.flags.insert(NodeFlags::VARIABLE_SIZE);
                    node.fail(error.to_string());
                    self.report(table, NotificationType::Error, &error, start, type_id);
                    table.push(node);
                    return Ok(false);
                }
            }
        } else {
            self.take(declared)?;
            start + declared
        };
        self.pos = end;

        let payload = &buffer[start..end];
        let mut node = flavor.create_node(index, type_id, start, payload.to_vec());
        if variable {
            node.flags.insert(NodeFlags::VARIABLE_SIZE);
        }

        if let Some(error) = tag_error {
            node.fail(error.to_string());
            self.report(table, NotificationType::Error, &error, tag_offset, type_id);
        } else if let Some(handler) = flavor.handler(type_id) {
            let mut reader =
                RecordReader::new(payload, start, self.version, self.config.strict_attributes);
            match handler.run(&mut reader, &mut node) {
                Ok(()) => {
                    if let Some(residual) = reader.take_residual() {
                        node.attributes.replace("residual", Value::Bytes(residual));
                    }
                }
                Err(error) if error.is_segment_fatal() && !self.config.failsafe => {
                    return Err(error);
                }
                Err(error) => {
                    node.fail(error.to_string());
                    self.report(table, NotificationType::Error, &error, start, type_id);
                }
            }
            for &name in reader.rebinds() {
                let error = InvError::AttributeRebind {
                    node: index,
                    name: name.to_string(),
                };
                self.report(table, NotificationType::Warning, &error, start, type_id);
            }
        } else if flavor != ReaderFlavor::Default {
            let error = InvError::UnknownRecordType(type_id);
            self.report(table, NotificationType::Warning, &error, start, type_id);
        }

        table.push(node);

        let marker_offset = self.take(MARKER_LEN)?;
        let mut marker = ByteCursor::with_base(&buffer[marker_offset..], marker_offset);
        let actual = marker.read_u32()?;
        if actual != block.length {
            return Err(InvError::BlockSizeMismatch {
                block: block_no,
                expected: block.length,
                actual,
            });
        }
        self.take(self.version.block_trailer_len())?;
        Ok(true)
    }

    /// Expect the terminator UUID right after the last block.
    fn check_terminator(&mut self, stream: &str) -> Result<()> {
        let mut cursor = ByteCursor::with_base(&self.buffer[self.pos..], self.pos);
        let terminator = cursor.read_uuid()?;
        if terminator != TERMINATOR {
            return Err(InvError::InvalidTerminator(terminator));
        }
        if !cursor.at_end() {
            self.notifications.push(
                Notification::new(
                    NotificationType::Warning,
                    format!("{} bytes after the segment terminator", cursor.remaining()),
                )
                .with_stream(stream)
                .at(cursor.absolute_position()),
            );
        }
        Ok(())
    }
}
