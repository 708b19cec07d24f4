//! Java linter with auto-fix support.

pub mod registry;
pub mod rules;
pub mod suppression;

pub use registry::{FromConfig, Properties, RuleRegistry};
pub use suppression::{PlainTextCommentFilterConfig, SuppressionContext};

use ternlint_diagnostics::Diagnostic;
use ternlint_java_cst::{CstNode, TreeWalker};
use ternlint_java_parser::JavaParser;
use ternlint_source_file::{LineIndex, SourceCode};
use ternlint_text_size::TextRange;

/// Context provided to rules during checking.
pub struct CheckContext<'a> {
    source: &'a str,
    line_index: LineIndex,
}

impl<'a> CheckContext<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            line_index: LineIndex::from_source_text(source),
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Get the cached line index.
    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Get the source code helper for line/column info.
    pub fn source_code(&self) -> SourceCode<'a, '_> {
        SourceCode::new(self.source, &self.line_index)
    }

    /// Get text at a given range.
    pub fn text_at(&self, range: TextRange) -> &'a str {
        &self.source[range]
    }
}

/// Trait for lint rules.
pub trait Rule: Send + Sync {
    /// The rule's name, as used in configuration and suppressions.
    fn name(&self) -> &'static str;

    /// Node kinds this rule cares about. Empty means run on all nodes.
    fn relevant_kinds(&self) -> &'static [&'static str] {
        &[]
    }

    /// Check a CST node for violations.
    fn check(&self, ctx: &CheckContext, node: &CstNode) -> Vec<Diagnostic>;
}

/// A diagnostic together with the rule that produced it.
#[derive(Debug, Clone)]
pub struct RuleDiagnostic {
    pub rule: &'static str,
    pub diagnostic: Diagnostic,
}

/// Result of linting a file.
#[derive(Debug, Default)]
pub struct LintResult {
    pub diagnostics: Vec<RuleDiagnostic>,
    /// Whether the parser had to recover from syntax errors.
    pub had_parse_errors: bool,
}

impl LintResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, other: LintResult) {
        self.diagnostics.extend(other.diagnostics);
        self.had_parse_errors |= other.had_parse_errors;
    }

    /// Get all fixable diagnostics.
    pub fn fixable(&self) -> impl Iterator<Item = &RuleDiagnostic> {
        self.diagnostics.iter().filter(|d| d.diagnostic.fix.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parse `source` and run every rule over it, dropping suppressed findings.
///
/// Returns `None` when the source could not be parsed at all.
pub fn lint_source(
    source: &str,
    rules: &[Box<dyn Rule>],
    suppression_filters: &[PlainTextCommentFilterConfig],
) -> Option<LintResult> {
    let mut parser = JavaParser::new();
    let parsed = parser.parse(source)?;

    let ctx = CheckContext::new(source);
    let root = CstNode::new(parsed.tree.root_node(), source);

    let mut suppressions = SuppressionContext::from_source(source, suppression_filters);
    suppressions.parse_suppress_warnings(&root);

    let mut result = LintResult {
        diagnostics: Vec::new(),
        had_parse_errors: parsed.has_errors(),
    };

    for node in TreeWalker::new(root.inner(), source) {
        for rule in rules {
            let kinds = rule.relevant_kinds();
            if !kinds.is_empty() && !kinds.contains(&node.kind()) {
                continue;
            }
            for diagnostic in rule.check(&ctx, &node) {
                if suppressions.is_suppressed(rule.name(), diagnostic.range.start()) {
                    tracing::debug!(rule = rule.name(), "suppressed diagnostic");
                    continue;
                }
                result.diagnostics.push(RuleDiagnostic {
                    rule: rule.name(),
                    diagnostic,
                });
            }
        }
    }

    Some(result)
}
