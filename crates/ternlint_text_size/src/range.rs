use std::cmp;
use std::fmt;
use std::ops::{Index, IndexMut, Range};

use crate::TextSize;

/// A range in text, represented as a pair of [`TextSize`][struct@TextSize].
///
/// It is a logic error for `start` to be greater than `end`.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRange {
    start: TextSize,
    end: TextSize,
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start().to_u32(), self.end().to_u32())
    }
}

impl TextRange {
    /// Creates a new `TextRange` with the given `start` and `end` (`start..end`).
    ///
    /// # Panics
    ///
    /// Panics if `end < start`.
    #[inline]
    pub fn new(start: TextSize, end: TextSize) -> TextRange {
        assert!(start.to_u32() <= end.to_u32());
        TextRange { start, end }
    }

    /// Create a new `TextRange` with the given `offset` and `len` (`offset..offset + len`).
    #[inline]
    pub fn at(offset: TextSize, len: TextSize) -> TextRange {
        TextRange::new(offset, offset + len)
    }

    /// Create a zero-length range at the specified offset (`offset..offset`).
    #[inline]
    pub fn empty(offset: TextSize) -> TextRange {
        TextRange {
            start: offset,
            end: offset,
        }
    }

    /// The start point of this range.
    #[inline]
    pub const fn start(self) -> TextSize {
        self.start
    }

    /// The end point of this range.
    #[inline]
    pub const fn end(self) -> TextSize {
        self.end
    }

    /// The size of this range.
    #[inline]
    pub fn len(self) -> TextSize {
        self.end - self.start
    }

    /// Check if this range is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Check if this range contains an offset.
    ///
    /// The end index is considered excluded.
    #[inline]
    pub fn contains(self, offset: TextSize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Check if this range completely contains another range.
    #[inline]
    pub fn contains_range(self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The range covered by both ranges, if it exists.
    #[inline]
    pub fn intersect(self, other: TextRange) -> Option<TextRange> {
        let start = cmp::max(self.start, other.start);
        let end = cmp::min(self.end, other.end);
        if end < start {
            return None;
        }
        Some(TextRange::new(start, end))
    }

    /// Extends the range to cover `other` as well.
    #[inline]
    #[must_use]
    pub fn cover(self, other: TextRange) -> TextRange {
        let start = cmp::min(self.start, other.start);
        let end = cmp::max(self.end, other.end);
        TextRange::new(start, end)
    }

    /// Subtracts an offset from the start and end positions.
    #[inline]
    #[must_use]
    pub fn sub_start(self, amount: TextSize) -> TextRange {
        TextRange::new(self.start - amount, self.end - amount)
    }
}

impl Index<TextRange> for str {
    type Output = str;

    #[inline]
    fn index(&self, index: TextRange) -> &str {
        &self[Range::<usize>::from(index)]
    }
}

impl Index<TextRange> for String {
    type Output = str;

    #[inline]
    fn index(&self, index: TextRange) -> &str {
        &self[Range::<usize>::from(index)]
    }
}

impl IndexMut<TextRange> for str {
    #[inline]
    fn index_mut(&mut self, index: TextRange) -> &mut str {
        &mut self[Range::<usize>::from(index)]
    }
}

impl From<TextRange> for Range<usize> {
    #[inline]
    fn from(r: TextRange) -> Self {
        r.start().into()..r.end().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_contains_excludes_end() {
        let r = range(2, 5);
        assert!(r.contains(TextSize::new(2)));
        assert!(r.contains(TextSize::new(4)));
        assert!(!r.contains(TextSize::new(5)));
    }

    #[test]
    fn test_contains_range() {
        assert!(range(0, 10).contains_range(range(2, 5)));
        assert!(range(0, 10).contains_range(range(0, 10)));
        assert!(!range(2, 5).contains_range(range(0, 10)));
    }

    #[test]
    fn test_cover_and_intersect() {
        assert_eq!(range(2, 5).cover(range(4, 9)), range(2, 9));
        assert_eq!(range(2, 5).intersect(range(4, 9)), Some(range(4, 5)));
        assert_eq!(range(2, 3).intersect(range(4, 9)), None);
    }

    #[test]
    fn test_index_str() {
        let text = "return c ? 1 : 2;";
        assert_eq!(&text[range(7, 8)], "c");
    }
}
