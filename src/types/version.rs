//! Segment format versions and the version gates derived from them.

use std::fmt;

/// Format generation tag of a segment (2010, 2011, ...).
///
/// Nearly every record layout decision depends on it: older files pad
/// between logical fields, newer ones append fields behind version gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FormatVersion(u32);

impl FormatVersion {
    /// Oldest generation the decoder understands.
    pub const MIN: FormatVersion = FormatVersion(2010);

    pub const V2010: FormatVersion = FormatVersion(2010);
    pub const V2011: FormatVersion = FormatVersion(2011);
    pub const V2012: FormatVersion = FormatVersion(2012);
    pub const V2013: FormatVersion = FormatVersion(2013);
    pub const V2014: FormatVersion = FormatVersion(2014);
    pub const V2015: FormatVersion = FormatVersion(2015);
    pub const V2016: FormatVersion = FormatVersion(2016);
    pub const V2017: FormatVersion = FormatVersion(2017);
    pub const V2018: FormatVersion = FormatVersion(2018);
    pub const V2019: FormatVersion = FormatVersion(2019);

    /// Wrap a raw generation tag.
    pub const fn new(value: u32) -> Self {
        FormatVersion(value)
    }

    /// Raw generation tag.
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Parse a version tag read from a segment preamble.
    ///
    /// Returns `None` for generations older than 2010.
    pub fn parse(value: u32) -> Option<Self> {
        if value >= Self::MIN.0 {
            Some(FormatVersion(value))
        } else {
            None
        }
    }

    /// True when the version is strictly newer than `year`.
    #[inline]
    pub fn after(&self, year: u32) -> bool {
        self.0 > year
    }

    /// True when the version is strictly older than `year`.
    #[inline]
    pub fn before(&self, year: u32) -> bool {
        self.0 < year
    }

    /// Pre-2011 files pad between logical fields (SkipBlockSize).
    #[inline]
    pub fn pads_blocks(&self) -> bool {
        self.before(2011)
    }

    /// 2015+ record blocks end with a 5-byte trailer instead of 4.
    #[inline]
    pub fn has_long_trailer(&self) -> bool {
        self.0 >= 2015
    }

    /// Size of the trailer that follows each block's size marker.
    pub fn block_trailer_len(&self) -> usize {
        if self.has_long_trailer() {
            5
        } else {
            4
        }
    }

    /// 2015+ lists may be preceded by zero words.
    #[inline]
    pub fn has_list_padding(&self) -> bool {
        self.0 >= 2015
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        FormatVersion::MIN
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
