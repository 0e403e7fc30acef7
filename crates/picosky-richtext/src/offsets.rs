//! Byte offset repair for facet ranges.
//!
//! Facets address post text by UTF-8 byte offsets produced by another service. Those offsets
//! can land inside a multi-byte codepoint or in the middle of a combining sequence, so every
//! range is snapped to grapheme-cluster boundaries before the text is cut. Every grapheme
//! boundary is also a codepoint boundary.

use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;

use crate::error::InvalidRangeError;

/// Which way to move an offset that does not sit on a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapDirection {
    /// Toward the start of the text.
    Backward,
    /// Toward the end of the text.
    Forward,
}

/// Grapheme boundary table over a borrowed UTF-8 string.
#[derive(Debug, Clone)]
pub struct ByteOffsetIndex<'a> {
    text: &'a str,
    /// Sorted byte offsets of every cluster start, plus `text.len()`.
    boundaries: Vec<usize>,
}

impl<'a> ByteOffsetIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.grapheme_indices(true).map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn grapheme_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// True if `offset` is within `[0, len]` and not inside a codepoint's encoding.
    pub fn is_codepoint_boundary(&self, offset: i64) -> bool {
        usize::try_from(offset).is_ok_and(|offset| self.text.is_char_boundary(offset))
    }

    /// True if `offset` starts a grapheme cluster or is the end of the text.
    pub fn is_grapheme_boundary(&self, offset: usize) -> bool {
        self.boundaries.binary_search(&offset).is_ok()
    }

    /// Clamp a possibly negative or oversized offset into `[0, len]`.
    pub fn clamp_to_text(&self, offset: i64) -> usize {
        if offset <= 0 {
            return 0;
        }
        usize::try_from(offset).map_or(self.len(), |offset| offset.min(self.len()))
    }

    /// Clamp `offset` into the text, then move it to the nearest cluster boundary in
    /// `direction`. Offsets already on a boundary are returned unchanged.
    pub fn clamp_to_boundary(&self, offset: i64, direction: SnapDirection) -> usize {
        let offset = self.clamp_to_text(offset);
        match self.boundaries.binary_search(&offset) {
            Ok(_) => offset,
            // 0 and len are both in the table, so an unmatched offset has neighbours on each side
            Err(idx) => match direction {
                SnapDirection::Backward => idx
                    .checked_sub(1)
                    .and_then(|i| self.boundaries.get(i))
                    .copied()
                    .unwrap_or(0),
                SnapDirection::Forward => self.boundaries.get(idx).copied().unwrap_or(self.len()),
            },
        }
    }

    /// Repair an untrusted byte range.
    ///
    /// Bounds are reordered so `start <= end`, clamped into the text, and widened outward to
    /// cluster boundaries so a partially covered character is kept whole. The result may be
    /// empty, e.g. when both bounds lie past the end of the text.
    pub fn clamp_range(&self, start: i64, end: i64) -> Range<usize> {
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        self.clamp_to_boundary(start, SnapDirection::Backward)
            ..self.clamp_to_boundary(end, SnapDirection::Forward)
    }

    /// Slice the text without any repair.
    pub fn slice(&self, start: usize, end: usize) -> Result<&'a str, InvalidRangeError> {
        let err = InvalidRangeError {
            start,
            end,
            len: self.len(),
        };
        if start > end {
            return Err(err);
        }
        self.text.get(start..end).ok_or(err)
    }

    /// Index of the cluster containing `offset`. Offsets at or past the end map to
    /// [`grapheme_count`](Self::grapheme_count).
    pub fn byte_to_grapheme(&self, offset: usize) -> usize {
        if offset >= self.len() {
            return self.grapheme_count();
        }
        self.boundaries
            .partition_point(|&boundary| boundary <= offset)
            .saturating_sub(1)
    }
}
