use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use ternlint_text_size::{TextRange, TextSize};

use crate::SourceLocation;

/// Index for fast [byte offset](TextSize) to [`SourceLocation`] conversions.
///
/// Cheap to clone; the line starts are shared.
#[derive(Clone, Eq, PartialEq)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
pub struct LineIndex {
    inner: Arc<LineIndexInner>,
}

#[derive(Eq, PartialEq)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
struct LineIndexInner {
    line_starts: Vec<TextSize>,
    kind: IndexKind,
}

impl LineIndex {
    /// Builds the [`LineIndex`] from the source text of a file.
    pub fn from_source_text(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts: Vec<TextSize> = Vec::with_capacity(text.len() / 60);
        line_starts.push(TextSize::default());

        for newline in memchr::memchr_iter(b'\n', bytes) {
            // `\r\n` counts as one line break; the `\r` belongs to the previous line.
            line_starts.push(TextSize::try_from(newline + 1).unwrap_or(TextSize::new(u32::MAX)));
        }

        let kind = if text.is_ascii() {
            IndexKind::Ascii
        } else {
            IndexKind::Utf8
        };

        Self {
            inner: Arc::new(LineIndexInner { line_starts, kind }),
        }
    }

    fn kind(&self) -> IndexKind {
        self.inner.kind
    }

    /// Returns the line and column number for a byte offset.
    ///
    /// Columns count characters, not bytes.
    pub fn line_column(&self, offset: TextSize, content: &str) -> SourceLocation {
        let line = self.line_index(offset);
        let line_start = self.line_start(line, content);

        let column = if self.kind().is_ascii() {
            usize::from(offset) - usize::from(line_start)
        } else {
            content[TextRange::new(line_start, offset)].chars().count()
        };

        SourceLocation {
            line,
            column: OneIndexed::from_zero_indexed(column),
        }
    }

    /// Returns the number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.line_starts().len()
    }

    /// Returns the row number for a given offset.
    pub fn line_index(&self, offset: TextSize) -> OneIndexed {
        match self.line_starts().binary_search(&offset) {
            // Offset is at the start of a line
            Ok(row) => OneIndexed::from_zero_indexed(row),
            Err(row) => {
                // SAFETY: Safe because the index always contains an entry for the offset 0
                OneIndexed::from_zero_indexed(row - 1)
            }
        }
    }

    /// Returns the byte offset where the `line` starts.
    pub fn line_start(&self, line: OneIndexed, contents: &str) -> TextSize {
        let row_index = line.to_zero_indexed();
        let starts = self.line_starts();

        // If start-of-line position after last line
        if row_index == starts.len() {
            TextSize::of(contents)
        } else {
            starts[row_index]
        }
    }

    /// Returns the byte offset of the `line`'s end, excluding the newline
    /// character(s).
    pub fn line_end(&self, line: OneIndexed, contents: &str) -> TextSize {
        let row_index = line.to_zero_indexed();
        let starts = self.line_starts();

        let end = if row_index + 1 >= starts.len() {
            TextSize::of(contents)
        } else {
            starts[row_index + 1] - TextSize::new(1)
        };

        // Strip a trailing `\r` of a `\r\n` line break.
        let line = &contents[usize::from(self.line_start(line, contents))..usize::from(end)];
        if line.ends_with('\r') {
            end - TextSize::new(1)
        } else {
            end
        }
    }

    /// Returns the [`TextRange`] of the `line` excluding its newline character(s).
    pub fn line_range(&self, line: OneIndexed, contents: &str) -> TextRange {
        let starts = self.line_starts();

        if starts.len() == line.to_zero_indexed() {
            TextRange::empty(TextSize::of(contents))
        } else {
            TextRange::new(
                self.line_start(line, contents),
                self.line_end(line, contents),
            )
        }
    }

    /// Returns the [byte offsets](TextSize) for every line.
    pub fn line_starts(&self) -> &[TextSize] {
        &self.inner.line_starts
    }
}

impl fmt::Debug for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.line_starts()).finish()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
enum IndexKind {
    /// Optimized index for an ASCII only document
    Ascii,

    /// Index for UTF8 documents
    Utf8,
}

impl IndexKind {
    const fn is_ascii(self) -> bool {
        matches!(self, IndexKind::Ascii)
    }
}

/// Type-safe wrapper for a value whose logical range starts at `1`, for
/// instance the line or column numbers in a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneIndexed(NonZeroUsize);

impl OneIndexed {
    /// The smallest value that can be represented by this integer type.
    pub const MIN: Self = Self(NonZeroUsize::MIN);

    /// Creates a non-zero if the given value is not zero.
    pub const fn new(value: usize) -> Option<Self> {
        match NonZeroUsize::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Construct a new [`OneIndexed`] from a zero-indexed value
    pub const fn from_zero_indexed(value: usize) -> Self {
        Self(NonZeroUsize::MIN.saturating_add(value))
    }

    /// Returns the value as a primitive type.
    pub const fn get(self) -> usize {
        self.0.get()
    }

    /// Return the zero-indexed primitive value for this [`OneIndexed`]
    pub const fn to_zero_indexed(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.get(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        let index = LineIndex::from_source_text("");
        assert_eq!(index.line_starts(), &[TextSize::from(0)]);
        assert_eq!(index.line_count(), 1);
    }

    #[test]
    fn test_crlf_line_range() {
        let contents = "a\r\nbc\r\n";
        let index = LineIndex::from_source_text(contents);
        assert_eq!(index.line_count(), 3);

        let range = index.line_range(OneIndexed::from_zero_indexed(1), contents);
        assert_eq!(&contents[range], "bc");
    }

    #[test]
    fn test_utf8_columns_count_chars() {
        let contents = "é = 1;\nx";
        let index = LineIndex::from_source_text(contents);
        let loc = index.line_column(TextSize::new(4), contents);
        assert_eq!(loc.line.get(), 1);
        assert_eq!(loc.column.get(), 4);
    }
}
