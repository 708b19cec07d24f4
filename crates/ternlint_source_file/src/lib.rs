//! Line and column lookup for source text.

use std::fmt;

use ternlint_text_size::{TextRange, TextSize};

pub use crate::line_index::{LineIndex, OneIndexed};

mod line_index;

/// Gives access to the source code of a file and allows mapping between
/// [`TextSize`] and [`SourceLocation`].
#[derive(Debug)]
pub struct SourceCode<'src, 'index> {
    text: &'src str,
    index: &'index LineIndex,
}

impl<'src, 'index> SourceCode<'src, 'index> {
    pub fn new(content: &'src str, index: &'index LineIndex) -> Self {
        Self {
            text: content,
            index,
        }
    }

    /// Computes the one indexed line and column numbers for `offset`.
    #[inline]
    pub fn line_column(&self, offset: TextSize) -> SourceLocation {
        self.index.line_column(offset, self.text)
    }

    /// Returns the offset at which the line containing `offset` starts.
    #[inline]
    pub fn line_start_of(&self, offset: TextSize) -> TextSize {
        let line = self.index.line_index(offset);
        self.index.line_start(line, self.text)
    }

    /// Returns the range of the line containing `offset`, excluding the newline.
    pub fn line_range_of(&self, offset: TextSize) -> TextRange {
        let line = self.index.line_index(offset);
        self.index.line_range(line, self.text)
    }

    /// Returns the whitespace that precedes the first token on the line
    /// containing `offset`.
    pub fn indentation_of(&self, offset: TextSize) -> &'src str {
        let line = &self.text[self.line_range_of(offset)];
        let trimmed = line.trim_start_matches([' ', '\t']);
        &line[..line.len() - trimmed.len()]
    }

    /// Returns the source text.
    pub fn text(&self) -> &'src str {
        self.text
    }

    /// Returns the number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.index.line_count()
    }
}

/// A one-indexed line and column position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub line: OneIndexed,
    pub column: OneIndexed,
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self {
            line: OneIndexed::MIN,
            column: OneIndexed::MIN,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_column() {
        let source = "class A {\n    void m() {\n        if (c) {}\n    }\n}\n";
        let index = LineIndex::from_source_text(source);
        let code = SourceCode::new(source, &index);

        let offset = TextSize::new(source.find("if").unwrap() as u32);
        let loc = code.line_column(offset);
        assert_eq!(loc.line.get(), 3);
        assert_eq!(loc.column.get(), 9);
        assert_eq!(loc.to_string(), "3:9");
    }

    #[test]
    fn test_indentation_of() {
        let source = "class A {\n\t  if (c) {}\n}";
        let index = LineIndex::from_source_text(source);
        let code = SourceCode::new(source, &index);

        let offset = TextSize::new(source.find("if").unwrap() as u32);
        assert_eq!(code.indentation_of(offset), "\t  ");
        assert_eq!(
            code.line_start_of(offset),
            TextSize::new(source.find('\t').unwrap() as u32)
        );
    }
}
