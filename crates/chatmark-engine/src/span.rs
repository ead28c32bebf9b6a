//! # Span arithmetic
//!
//! Every offset the engine hands to a renderer is measured in UTF-16 code
//! units, so that JavaScript, Kotlin and Swift clients index the same string
//! the same way. Internally text is UTF-8 and scanners work on byte ranges;
//! this module is the only place the two coordinate systems meet.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open range `[start, start + length)` in UTF-16 code units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: u32,
    /// Number of code units covered.
    pub length: u32,
}

impl Span {
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    /// Exclusive end offset. Saturates instead of wrapping.
    #[must_use]
    pub fn end(self) -> u32 {
        self.start.saturating_add(self.length)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.length == 0
    }

    /// True when the two spans share at least one code unit.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Clips the span to `[0, limit)`. Returns `None` when nothing is left.
    #[must_use]
    pub fn clipped(self, limit: u32) -> Option<Self> {
        if self.start >= limit {
            return None;
        }
        let end = self.end().min(limit);
        let clipped = Self {
            start: self.start,
            length: end - self.start,
        };
        (!clipped.is_empty()).then_some(clipped)
    }
}

/// Length of `s` in UTF-16 code units.
///
/// Saturates at `u32::MAX`; inputs that large are rejected long before they
/// reach a scanner.
pub fn utf16_len(s: &str) -> u32 {
    u32::try_from(s.encode_utf16().count()).unwrap_or(u32::MAX)
}

/// UTF-16 offset of the byte index `byte_idx` in `s`.
///
/// `byte_idx` must sit on a char boundary; callers only pass boundaries that
/// came out of `str::find`, regex matches or ASCII delimiters.
pub fn utf16_offset(s: &str, byte_idx: usize) -> u32 {
    utf16_len(&s[..byte_idx])
}

/// Byte index of the UTF-16 offset `offset` in `s`, or `None` when the offset
/// is past the end or lands inside a surrogate pair.
pub fn byte_offset(s: &str, offset: u32) -> Option<usize> {
    let mut units = 0u32;
    for (idx, ch) in s.char_indices() {
        if units == offset {
            return Some(idx);
        }
        if units > offset {
            return None;
        }
        units += ch.len_utf16() as u32;
    }
    (units == offset).then_some(s.len())
}

/// Slices `s` by a UTF-16 span.
pub fn slice(s: &str, span: Span) -> Option<&str> {
    let start = byte_offset(s, span.start)?;
    let end = byte_offset(s, span.end())?;
    s.get(start..end)
}

/// Converts a byte range of `s` into a UTF-16 span offset by `base`.
pub fn span_of(s: &str, range: Range<usize>, base: u32) -> Span {
    let start = utf16_offset(s, range.start);
    let length = utf16_len(&s[range]);
    Span::new(base.saturating_add(start), length)
}

/// True when the two byte ranges share at least one byte.
pub fn ranges_overlap(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
