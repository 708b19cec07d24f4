//! Java parser for ternlint, built on tree-sitter-java.

use std::sync::Arc;

use thiserror::Error;

/// Errors raised while setting up the parser.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Failed to load Java grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

/// Result of parsing a Java source file.
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub source: Arc<str>,
}

impl ParseResult {
    /// Whether tree-sitter had to recover from syntax errors.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Java parser wrapping tree-sitter.
pub struct JavaParser {
    parser: tree_sitter::Parser,
}

/// Return the tree-sitter Java language.
pub fn java_language() -> tree_sitter::Language {
    tree_sitter_java::LANGUAGE.into()
}

impl JavaParser {
    /// Create a new Java parser.
    pub fn new() -> Self {
        Self::try_new().expect("Failed to load Java grammar")
    }

    /// Create a new Java parser, reporting a grammar/ABI mismatch as an error.
    pub fn try_new() -> Result<Self, ParserError> {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&java_language())?;
        Ok(Self { parser })
    }

    /// Parse Java source code into a syntax tree.
    pub fn parse(&mut self, source: &str) -> Option<ParseResult> {
        let tree = self.parser.parse(source, None)?;
        Some(ParseResult {
            tree,
            source: source.into(),
        })
    }
}

impl Default for JavaParser {
    fn default() -> Self {
        Self::new()
    }
}
