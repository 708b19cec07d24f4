//! IfToTernary rule implementation.
//!
//! Reports `if` statements whose branches differ only at positions where a
//! conditional expression is legal, and offers to collapse them:
//!
//! ```java
//! if (c) { return "Foo"; } else { return "Bar"; }
//! // becomes
//! return c ? "Foo" : "Bar";
//! ```

pub mod builder;
pub mod diff;
pub mod eligibility;
pub mod engine;
mod render;
pub mod virtual_else;

pub use builder::{ConditionalExpr, Replacement, ReplacementStatement, Substitution};
pub use diff::DiffPair;
pub use eligibility::{EligibleContext, Site};
pub use engine::{EngineError, PotentialRewrite, RewriteKind, classify_severity, evaluate};
pub use virtual_else::VirtualElse;

use ternlint_diagnostics::{
    Applicability, Diagnostic, Edit, Fix, FixAvailability, Severity, Violation,
};
use ternlint_java_cst::{CstNode, NodeId, SyntaxKind, SyntaxTree};

use crate::{CheckContext, FromConfig, Properties, Rule};

const RELEVANT_KINDS: &[&str] = &["if_statement"];

/// Configuration for the IfToTernary rule.
#[derive(Debug, Clone)]
pub struct IfToTernary {
    /// Consider `if` statements without `else` by borrowing the statements after them.
    pub allow_virtual_else: bool,
    /// Report rewrites that create several conditionals or statements.
    pub report_complex: bool,
    /// Skip rewrites that would create more conditionals than this.
    pub max_sites: Option<usize>,
}

impl Default for IfToTernary {
    fn default() -> Self {
        Self {
            allow_virtual_else: true,
            report_complex: true,
            max_sites: None,
        }
    }
}

impl FromConfig for IfToTernary {
    const MODULE_NAME: &'static str = "IfToTernary";

    fn from_config(properties: &Properties) -> Self {
        let defaults = Self::default();

        let allow_virtual_else = properties
            .get("allowVirtualElse")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.allow_virtual_else);

        let report_complex = properties
            .get("reportComplex")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.report_complex);

        let max_sites = properties
            .get("maxSites")
            .and_then(|v| v.parse::<usize>().ok());

        Self {
            allow_virtual_else,
            report_complex,
            max_sites,
        }
    }
}

/// Violation for an `if` statement that can become conditional expressions.
#[derive(Debug, Clone)]
pub struct IfToTernaryViolation {
    pub sites: usize,
    pub kind: RewriteKind,
}

impl Violation for IfToTernaryViolation {
    const FIX_AVAILABILITY: FixAvailability = FixAvailability::Sometimes;

    fn message(&self) -> String {
        match (self.kind, self.sites) {
            (RewriteKind::Simple, _) => {
                "'if' statement can be replaced with a conditional expression.".to_string()
            }
            (RewriteKind::Complex, 1) => {
                "'if' statement can be replaced with 1 conditional expression.".to_string()
            }
            (RewriteKind::Complex, n) => {
                format!("'if' statement can be replaced with {n} conditional expressions.")
            }
        }
    }

    fn fix_title(&self) -> Option<String> {
        Some(if self.sites == 1 {
            "Replace with conditional expression".to_string()
        } else {
            "Replace with conditional expressions".to_string()
        })
    }

    fn severity(&self) -> Severity {
        match self.kind {
            RewriteKind::Simple => Severity::Warning,
            RewriteKind::Complex => Severity::Info,
        }
    }

    fn parameters(&self) -> Vec<(&'static str, String)> {
        let kind = match self.kind {
            RewriteKind::Simple => "simple",
            RewriteKind::Complex => "complex",
        };
        vec![("count", self.sites.to_string()), ("kind", kind.to_string())]
    }
}

impl Rule for IfToTernary {
    fn name(&self) -> &'static str {
        "IfToTernary"
    }

    fn relevant_kinds(&self) -> &'static [&'static str] {
        RELEVANT_KINDS
    }

    fn check(&self, ctx: &CheckContext, node: &CstNode) -> Vec<Diagnostic> {
        if node.kind() != "if_statement" {
            return vec![];
        }

        // The parent holds the statements a virtual else borrows.
        let Some(parent) = node.parent() else {
            return vec![];
        };
        if parent.inner().has_error() {
            return vec![];
        }

        let tree = SyntaxTree::build(parent.inner(), ctx.source());
        let Some(if_id) = tree.find(&node.inner()) else {
            return vec![];
        };

        let rewrite = match engine::evaluate(&tree, if_id) {
            Ok(rewrite) => rewrite,
            Err(err) => {
                tracing::warn!(%err, "skipping if statement");
                return vec![];
            }
        };
        let Some(replacement) = rewrite.replacement() else {
            return vec![];
        };

        let kind = classify_severity(replacement);
        if !self.is_reported(replacement, kind) {
            return vec![];
        }

        let keyword = node.children().next().map_or(node.range(), |kw| kw.range());
        let edit = Edit::range_replacement(
            replacement.render(&tree, &ctx.source_code()),
            replacement.replaced_range(&tree),
        );
        let fix = Fix::applicable_edit(edit, applicability(&tree, replacement));

        vec![
            Diagnostic::new(
                IfToTernaryViolation {
                    sites: replacement.ternary_count,
                    kind,
                },
                keyword,
            )
            .with_fix(fix),
        ]
    }
}

impl IfToTernary {
    fn is_reported(&self, replacement: &Replacement, kind: RewriteKind) -> bool {
        if !self.allow_virtual_else && !replacement.borrowed().is_empty() {
            return false;
        }
        if kind.is_complex() && !self.report_complex {
            return false;
        }
        self.max_sites
            .is_none_or(|max| replacement.ternary_count <= max)
    }
}

/// Safe unless the rewrite may evaluate the condition differently, widen a
/// declaration's scope, or drop comments.
fn applicability(tree: &SyntaxTree, replacement: &Replacement) -> Applicability {
    let condition = replacement
        .statements
        .iter()
        .flat_map(|statement| &statement.substitutions)
        .map(|substitution| substitution.expr.condition)
        .next();

    let repeats_condition = replacement.ternary_count > 1
        && condition.is_some_and(|condition| !is_side_effect_free(tree, condition));

    // A statement before a site may change what the condition evaluates to.
    let reorders_condition = replacement.statements.len() > 1;

    let declares_locals = replacement
        .statements
        .iter()
        .any(|statement| tree.kind(statement.template) == SyntaxKind::LocalVariableDeclaration);

    let range = replacement.replaced_range(tree);
    let drops_comments = tree
        .comments()
        .iter()
        .filter(|comment| range.contains_range(**comment))
        .any(|comment| !replacement.keeps(tree, comment.start()));

    if repeats_condition || reorders_condition || declares_locals || drops_comments {
        Applicability::Unsafe
    } else {
        Applicability::Safe
    }
}

/// Expressions that can be evaluated any number of times with the same result
/// and no effect.
fn is_side_effect_free(tree: &SyntaxTree, id: NodeId) -> bool {
    match tree.kind(id) {
        SyntaxKind::Identifier
        | SyntaxKind::IntegerLiteral
        | SyntaxKind::FloatingPointLiteral
        | SyntaxKind::CharacterLiteral
        | SyntaxKind::StringLiteral
        | SyntaxKind::True
        | SyntaxKind::False
        | SyntaxKind::NullLiteral
        | SyntaxKind::This => true,
        SyntaxKind::FieldAccess
        | SyntaxKind::ParenthesizedExpression
        | SyntaxKind::UnaryExpression
        | SyntaxKind::BinaryExpression => tree
            .child_nodes(id)
            .all(|child| is_side_effect_free(tree, child)),
        _ => false,
    }
}
