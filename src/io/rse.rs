//! Fixed-layout document streams: `RSeStorage/RSeDb`, `RSeSegInfo`,
//! `RSeDbRevisionInfo`, `UFRxDoc` and `Protein`.
//!
//! These are small headers read once per document, parsed with `nom`
//! combinators over the whole stream.

use nom::{
    bytes::complete::take,
    combinator::{cond, map},
    multi::count,
    number::complete::{le_u32, le_u64},
    sequence::tuple,
    IResult,
};
use time::OffsetDateTime;

use crate::error::{InvError, Result};
use crate::io::cursor::filetime_to_date_time;
use crate::model::document::{
    DatabaseHeader, Fingerprint, RevisionEntry, SegmentDirectory, SegmentInfoEntry,
};
use crate::types::Uuid;

/// Segment directory layouts seen in the wild.
pub const KNOWN_DIRECTORY_VERSIONS: &[u32] = &[0x10, 0x15, 0x1A, 0x1D, 0x1F];

/// Directory layout whose trailing per-entry block is not decoded.
pub const PARTIAL_DIRECTORY_VERSION: u32 = 0x1D;

fn uuid(input: &[u8]) -> IResult<&[u8], Uuid> {
    map(take(16usize), |bytes: &[u8]| {
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Uuid::from_bytes_le(raw)
    })(input)
}

/// FILETIME; zero means unset.
fn filetime(input: &[u8]) -> IResult<&[u8], Option<OffsetDateTime>> {
    map(le_u64, |ticks| {
        if ticks == 0 {
            None
        } else {
            filetime_to_date_time(ticks)
        }
    })(input)
}

fn text16(input: &[u8]) -> IResult<&[u8], String> {
    let (input, units) = le_u32(input)?;
    let (input, raw) = take((units as usize).saturating_mul(2))(input)?;
    let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(raw);
    Ok((input, text.into_owned()))
}

fn sized_block(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let (input, len) = le_u32(input)?;
    map(take(len as usize), |b: &[u8]| b.to_vec())(input)
}

fn database_header(input: &[u8]) -> IResult<&[u8], DatabaseHeader> {
    map(
        tuple((uuid, le_u32, filetime, filetime, uuid)),
        |(schema, version, created, modified, document)| DatabaseHeader {
            schema,
            version,
            created,
            modified,
            document,
        },
    )(input)
}

fn directory_entry(input: &[u8], version: u32) -> IResult<&[u8], SegmentInfoEntry> {
    let (input, name) = text16(input)?;
    let (input, id) = uuid(input)?;
    let (input, type_id) = cond(version >= 0x15, uuid)(input)?;
    let (input, flags) = cond(version >= 0x1A, le_u32)(input)?;
    let (input, raw) = cond(version == PARTIAL_DIRECTORY_VERSION, sized_block)(input)?;
    let (input, revision) = cond(version >= 0x1F, le_u32)(input)?;
    Ok((
        input,
        SegmentInfoEntry {
            name,
            id,
            type_id,
            flags,
            revision,
            raw,
        },
    ))
}

/// Leading `u32` entry count, bounded by the bytes that follow.
fn entry_count(input: &[u8]) -> Result<(&[u8], usize)> {
    let (input, n) = le_u32::<_, nom::error::Error<&[u8]>>(input)?;
    let n = n as usize;
    if n > input.len() {
        return Err(InvError::InvalidFormat(format!(
            "{n} entries declared, {} bytes follow",
            input.len()
        )));
    }
    Ok((input, n))
}

fn revision_entry(input: &[u8]) -> IResult<&[u8], RevisionEntry> {
    map(tuple((uuid, le_u32, le_u32)), |(id, number, flags)| {
        RevisionEntry { id, number, flags }
    })(input)
}

fn fingerprint(input: &[u8]) -> IResult<&[u8], Fingerprint> {
    map(
        tuple((le_u32, le_u32, filetime, text16)),
        |(schema, release, saved, application)| Fingerprint {
            schema,
            release,
            saved,
            application,
        },
    )(input)
}

/// Parse `RSeStorage/RSeDb`.
pub fn read_database_header(data: &[u8]) -> Result<DatabaseHeader> {
    let (_, header) = database_header(data)?;
    Ok(header)
}

/// Parse `RSeStorage/RSeSegInfo` laid out for directory `version`.
///
/// Versions below the oldest known layout are rejected.
pub fn read_segment_directory(data: &[u8], version: u32) -> Result<SegmentDirectory> {
    if version < KNOWN_DIRECTORY_VERSIONS[0] {
        return Err(InvError::UnsupportedVersion(format!(
            "segment directory {version:#X}"
        )));
    }
    let (input, n) = entry_count(data)?;
    let (_, entries) = count(|i| directory_entry(i, version), n)(input)?;
    Ok(SegmentDirectory { version, entries })
}

/// Parse `RSeStorage/RSeDbRevisionInfo`.
pub fn read_revision_info(data: &[u8]) -> Result<Vec<RevisionEntry>> {
    let (input, n) = entry_count(data)?;
    let (_, entries) = count(revision_entry, n)(input)?;
    Ok(entries)
}

/// Parse `UFRxDoc`.
pub fn read_fingerprint(data: &[u8]) -> Result<Fingerprint> {
    let (_, fp) = fingerprint(data)?;
    Ok(fp)
}

/// Extract the payload of a `Protein` stream.
pub fn read_protein(data: &[u8]) -> Result<Vec<u8>> {
    let (_, payload) = sized_block(data)?;
    Ok(payload)
}
