//! Notebook segment records: engineer's notes attached to the model.

use once_cell::sync::Lazy;

use super::FieldKind::*;
use super::HandlerBody::Script;
use super::{build_table, child, cross, field, list, Field, HandlerTable, HEADER0, NAME};
use crate::io::segment::record_reader::ElementKind;

/// Type id of a note's rich-text body; its declared size is unreliable.
pub const NOTE_TEXT: u32 = 0x74DF96E0;

const NOTEBOOK: &[Field] = &[HEADER0, NAME, list("notes", ElementKind::ChildRef)];

const NOTE: &[Field] = &[
    HEADER0,
    NAME,
    child("text"),
    field("created", DateTime),
    field("modified", DateTime),
    cross("target"),
];

const NOTE_TEXT_FIELDS: &[Field] = &[HEADER0, field("text", Text16)];

const NOTE_FOLDER: &[Field] = &[HEADER0, NAME, list("notes", ElementKind::CrossRef)];

pub static TABLE: Lazy<HandlerTable> = Lazy::new(|| {
    build_table(&[
        (0x4C415964, "Notebook", Script(NOTEBOOK)),
        (0x4C415965, "Note", Script(NOTE)),
        (NOTE_TEXT, "NoteText", Script(NOTE_TEXT_FIELDS)),
        (0x4C415966, "NoteFolder", Script(NOTE_FOLDER)),
    ])
});
