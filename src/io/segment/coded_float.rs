//! Coded float transformations.
//!
//! Transformations and some vectors are stored compactly: a `u16×2` tag
//! selects a layout from a fixed case table, and the layout fixes how many
//! `f64` values follow (from none for the identity up to twelve for a full
//! affine matrix).

use std::fmt;

use crate::error::{InvError, Result};
use crate::io::cursor::ByteCursor;

/// Layout selected by a coded-float tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodedLayout {
    Identity,
    IdentityMirrored,
    TranslationX,
    TranslationY,
    TranslationZ,
    TranslationXY,
    Translation,
    UniformScale,
    ScaleTranslation,
    RotationZ,
    RotationZTranslation,
    Rotation,
    RotationMirrored,
    RotationScale,
    RotationTranslation,
    RotationTranslationMirrored,
    Direction,
    Frame,
    Point2D,
    Point3D,
    Affine,
}

impl CodedLayout {
    /// Number of `f64` values that follow the tag.
    pub fn value_count(&self) -> usize {
        match self {
            CodedLayout::Identity | CodedLayout::IdentityMirrored => 0,
            CodedLayout::TranslationX
            | CodedLayout::TranslationY
            | CodedLayout::TranslationZ
            | CodedLayout::UniformScale => 1,
            CodedLayout::TranslationXY | CodedLayout::RotationZ | CodedLayout::Point2D => 2,
            CodedLayout::Translation | CodedLayout::Direction | CodedLayout::Point3D => 3,
            CodedLayout::ScaleTranslation => 4,
            CodedLayout::RotationZTranslation => 5,
            CodedLayout::Frame => 6,
            CodedLayout::Rotation | CodedLayout::RotationMirrored => 9,
            CodedLayout::RotationScale => 10,
            CodedLayout::RotationTranslation
            | CodedLayout::RotationTranslationMirrored
            | CodedLayout::Affine => 12,
        }
    }
}

/// The case table: `(tag_a, tag_b) → layout`.
const CASES: &[((u16, u16), CodedLayout)] = &[
    ((0x0000, 0x0000), CodedLayout::Identity),
    ((0x0000, 0x0001), CodedLayout::IdentityMirrored),
    ((0x0001, 0x0000), CodedLayout::TranslationX),
    ((0x0002, 0x0000), CodedLayout::TranslationY),
    ((0x0004, 0x0000), CodedLayout::TranslationZ),
    ((0x0003, 0x0000), CodedLayout::TranslationXY),
    ((0x0007, 0x0000), CodedLayout::Translation),
    ((0x0008, 0x0000), CodedLayout::UniformScale),
    ((0x000F, 0x0000), CodedLayout::ScaleTranslation),
    ((0x0010, 0x0000), CodedLayout::RotationZ),
    ((0x0017, 0x0000), CodedLayout::RotationZTranslation),
    ((0x0020, 0x0000), CodedLayout::Rotation),
    ((0x0020, 0x0001), CodedLayout::RotationMirrored),
    ((0x0028, 0x0000), CodedLayout::RotationScale),
    ((0x0027, 0x0000), CodedLayout::RotationTranslation),
    ((0x0027, 0x0001), CodedLayout::RotationTranslationMirrored),
    ((0x0040, 0x0000), CodedLayout::Direction),
    ((0x0047, 0x0000), CodedLayout::Frame),
    ((0x0080, 0x0000), CodedLayout::Point2D),
    ((0x0081, 0x0000), CodedLayout::Point3D),
    ((0x00FF, 0x0000), CodedLayout::Affine),
];

/// Look up the layout for a tag.
pub fn layout_for(tag: (u16, u16)) -> Option<CodedLayout> {
    CASES
        .iter()
        .find(|(case, _)| *case == tag)
        .map(|(_, layout)| *layout)
}

/// A decoded coded-float value.
#[derive(Debug, Clone, PartialEq)]
pub struct CodedFloat {
    /// Raw tag as read.
    pub tag: (u16, u16),
    /// Layout selected by the tag.
    pub layout: CodedLayout,
    /// The `f64` payload, `layout.value_count()` long.
    pub values: Vec<f64>,
}

impl CodedFloat {
    /// Read a tag and its payload.
    ///
    /// Unknown tags fail with `MalformedRecord`, naming the tag bytes.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let offset = cursor.absolute_position();
        let a = cursor.read_u16()?;
        let b = cursor.read_u16()?;
        let layout = layout_for((a, b)).ok_or_else(|| {
            InvError::MalformedRecord(format!(
                "unknown coded float tag [{a:04X},{b:04X}] at {offset:#X}"
            ))
        })?;
        let values = cursor.read_f64_array(layout.value_count())?;
        Ok(Self {
            tag: (a, b),
            layout,
            values,
        })
    }

    /// Whether this is an identity transformation.
    pub fn is_identity(&self) -> bool {
        matches!(
            self.layout,
            CodedLayout::Identity | CodedLayout::IdentityMirrored
        )
    }
}

impl fmt::Display for CodedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.layout)?;
        if !self.values.is_empty() {
            let parts: Vec<String> = self.values.iter().map(|v| format!("{v}")).collect();
            write!(f, "({})", parts.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(a: u16, b: u16, values: &[f64]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&a.to_le_bytes());
        out.extend_from_slice(&b.to_le_bytes());
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_identity_has_no_payload() {
        let data = encode(0, 0, &[]);
        let mut c = ByteCursor::new(&data);
        let cf = CodedFloat::read(&mut c).unwrap();
        assert!(cf.is_identity());
        assert!(c.at_end());
    }

    #[test]
    fn test_translation() {
        let data = encode(0x0007, 0, &[1.0, 2.0, 3.0]);
        let mut c = ByteCursor::new(&data);
        let cf = CodedFloat::read(&mut c).unwrap();
        assert_eq!(cf.layout, CodedLayout::Translation);
        assert_eq!(cf.values, vec![1.0, 2.0, 3.0]);
        assert_eq!(cf.to_string(), "Translation(1, 2, 3)");
    }

    #[test]
    fn test_full_affine_twelve_values() {
        let values: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let data = encode(0x00FF, 0, &values);
        let mut c = ByteCursor::new(&data);
        let cf = CodedFloat::read(&mut c).unwrap();
        assert_eq!(cf.values.len(), 12);
    }

    #[test]
    fn test_unknown_tag_is_malformed() {
        let data = encode(0x1234, 0x5678, &[]);
        let mut c = ByteCursor::new(&data);
        match CodedFloat::read(&mut c) {
            Err(InvError::MalformedRecord(msg)) => assert!(msg.contains("[1234,5678]")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_table_has_unique_tags() {
        for (i, (tag, _)) in CASES.iter().enumerate() {
            assert!(CASES[i + 1..].iter().all(|(other, _)| other != tag));
        }
    }
}
