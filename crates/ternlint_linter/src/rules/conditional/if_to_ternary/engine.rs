//! Decides whether an `if` statement collapses into conditional expressions.
//!
//! ```text
//! if ── has else? ──yes──> else statements ─┐
//!   └──no──> virtual else ──none──> NoReplacement
//!                 └──────────────> diff each statement pair
//!                                       │
//!                 classify every diff ──┤── any ineligible ──> NoReplacement
//!                                       └── build ──> ReplacementPossible
//! ```

use ternlint_java_cst::{NodeId, SyntaxKind, SyntaxTree};
use thiserror::Error;

use super::builder::{self, Replacement};
use super::diff;
use super::eligibility;
use super::virtual_else;

/// Contract violations: the engine was handed something other than an `if`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("node {0} does not belong to this tree")]
    UnknownNode(NodeId),
    #[error("expected an if_statement, found {0}")]
    NotAnIfStatement(&'static str),
    #[error("if_statement has no {0}")]
    MissingField(&'static str),
}

/// Outcome of evaluating one `if` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PotentialRewrite {
    NoReplacement,
    ReplacementPossible(Replacement),
}

impl PotentialRewrite {
    pub fn replacement(&self) -> Option<&Replacement> {
        match self {
            Self::NoReplacement => None,
            Self::ReplacementPossible(replacement) => Some(replacement),
        }
    }
}

/// How a rewrite is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, is_macro::Is)]
pub enum RewriteKind {
    /// One conditional expression in one statement.
    Simple,
    Complex,
}

pub fn classify_severity(replacement: &Replacement) -> RewriteKind {
    if replacement.ternary_count == 1 && replacement.statements.len() == 1 {
        RewriteKind::Simple
    } else {
        RewriteKind::Complex
    }
}

/// Evaluate `if_statement`, which must be a node of `tree`.
///
/// The tree should include the statement sequence around the `if` so that
/// a virtual else can be borrowed from it.
pub fn evaluate(tree: &SyntaxTree, if_statement: NodeId) -> Result<PotentialRewrite, EngineError> {
    let node = tree
        .get(if_statement)
        .ok_or(EngineError::UnknownNode(if_statement))?;
    if node.kind != SyntaxKind::IfStatement {
        return Err(EngineError::NotAnIfStatement(node.raw_kind));
    }

    let condition = tree
        .child_by_field(if_statement, "condition")
        .ok_or(EngineError::MissingField("condition"))?;
    let consequence = tree
        .child_by_field(if_statement, "consequence")
        .ok_or(EngineError::MissingField("consequence"))?;

    let then_statements = branch_statements(tree, consequence);

    let (else_statements, borrowed) = match tree.child_by_field(if_statement, "alternative") {
        Some(alternative) => (branch_statements(tree, alternative), Vec::new()),
        None => match virtual_else::synthesize_else(tree, if_statement, &then_statements) {
            Some(virtual_else) => (virtual_else.statements.clone(), virtual_else.statements),
            None => return Ok(PotentialRewrite::NoReplacement),
        },
    };

    if then_statements.len() != else_statements.len() {
        tracing::debug!(
            then = then_statements.len(),
            other = else_statements.len(),
            "branches have different statement counts"
        );
        return Ok(PotentialRewrite::NoReplacement);
    }

    let mut sites = Vec::new();
    for (&before, &after) in then_statements.iter().zip(&else_statements) {
        let diffs = diff::find(tree, before, after);
        if diffs.is_empty() {
            continue;
        }
        let Some(accepted) = eligibility::classify(tree, &diffs, before, after) else {
            return Ok(PotentialRewrite::NoReplacement);
        };
        sites.extend(accepted);
    }

    if sites.is_empty() {
        tracing::debug!("branches are equivalent, nothing to simplify");
        return Ok(PotentialRewrite::NoReplacement);
    }

    if !fits_parent(tree, if_statement, &then_statements) {
        tracing::debug!("replacement does not fit where the if stands");
        return Ok(PotentialRewrite::NoReplacement);
    }

    let replacement = builder::build(
        tree,
        if_statement,
        condition,
        &sites,
        &then_statements,
        &borrowed,
    );
    tracing::debug!(
        sites = replacement.ternary_count,
        statements = replacement.statements.len(),
        borrowed = borrowed.len(),
        "if statement can be rewritten"
    );
    Ok(PotentialRewrite::ReplacementPossible(replacement))
}

/// Statements of a branch: the contents of a block, or the statement itself.
fn branch_statements(tree: &SyntaxTree, branch: NodeId) -> Vec<NodeId> {
    if tree.kind(branch) == SyntaxKind::Block {
        tree.child_nodes(branch).collect()
    } else {
        vec![branch]
    }
}

/// Several statements, or a declaration, can only replace an `if` that
/// stands directly in a statement sequence.
fn fits_parent(tree: &SyntaxTree, if_statement: NodeId, then_statements: &[NodeId]) -> bool {
    let in_sequence = tree
        .parent(if_statement)
        .is_some_and(|parent| tree.kind(parent).is_statement_container());
    in_sequence
        || (then_statements.len() == 1
            && tree.kind(then_statements[0]) != SyntaxKind::LocalVariableDeclaration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ternlint_java_cst::TreeWalker;
    use ternlint_java_parser::JavaParser;

    fn with_if(source: &str, f: impl FnOnce(&SyntaxTree, NodeId)) {
        let mut parser = JavaParser::new();
        let result = parser.parse(source).unwrap();
        let if_node = TreeWalker::new(result.tree.root_node(), source)
            .find(|n| n.kind() == "if_statement")
            .unwrap();
        let tree = SyntaxTree::build(if_node.parent().unwrap().inner(), source);
        let if_id = tree.find(&if_node.inner()).unwrap();
        f(&tree, if_id);
    }

    #[test]
    fn test_not_an_if_statement() {
        let source = "class T { int m(boolean c) { if (c) { return 1; } return 2; } }";
        with_if(source, |tree, _| {
            assert_eq!(
                evaluate(tree, tree.root()),
                Err(EngineError::NotAnIfStatement("block"))
            );
        });
    }

    #[test]
    fn test_explicit_else_single_site() {
        let source = "class T { int m(boolean c) { if (c) { return 1; } else { return 2; } } }";
        with_if(source, |tree, if_id| {
            let rewrite = evaluate(tree, if_id).unwrap();
            let replacement = rewrite.replacement().unwrap();
            assert_eq!(replacement.ternary_count, 1);
            assert_eq!(replacement.removals, vec![if_id]);
            assert!(classify_severity(replacement).is_simple());
        });
    }

    #[test]
    fn test_statement_count_mismatch() {
        let source = "class T { void m(boolean c) { if (c) { a(); b(); } else { a(); } } }";
        with_if(source, |tree, if_id| {
            assert_eq!(evaluate(tree, if_id), Ok(PotentialRewrite::NoReplacement));
        });
    }

    #[test]
    fn test_identical_branches_are_not_rewritten() {
        let source = "class T { int m(boolean c) { if (c) { return 1; } else { return 1; } } }";
        with_if(source, |tree, if_id| {
            assert_eq!(evaluate(tree, if_id), Ok(PotentialRewrite::NoReplacement));
        });
    }

    #[test]
    fn test_no_else_without_jump() {
        let source = "class T { void m(boolean c) { if (c) { x = 1; } x = 2; } }";
        with_if(source, |tree, if_id| {
            assert_eq!(evaluate(tree, if_id), Ok(PotentialRewrite::NoReplacement));
        });
    }

    #[test]
    fn test_multiple_statements_need_a_sequence() {
        let source = "class T { void m(boolean c, boolean d) { \
             if (d) x = 0; else if (c) { x = 1; y = 1; } else { x = 2; y = 2; } } }";
        let mut parser = JavaParser::new();
        let result = parser.parse(source).unwrap();
        let inner_if = TreeWalker::new(result.tree.root_node(), source)
            .filter(|n| n.kind() == "if_statement")
            .nth(1)
            .unwrap();
        let outer = inner_if.parent().unwrap();
        let tree = SyntaxTree::build(outer.inner(), source);
        let if_id = tree.find(&inner_if.inner()).unwrap();

        assert_eq!(evaluate(&tree, if_id), Ok(PotentialRewrite::NoReplacement));
    }

    #[test]
    fn test_two_statements_complex() {
        let source = "class T { void m(boolean c) { if (c) { x = 1; y = 1; } else { x = 2; y = 2; } } }";
        with_if(source, |tree, if_id| {
            let rewrite = evaluate(tree, if_id).unwrap();
            let replacement = rewrite.replacement().unwrap();
            assert_eq!(replacement.ternary_count, 2);
            assert_eq!(replacement.statements.len(), 2);
            assert_eq!(classify_severity(replacement), RewriteKind::Complex);
        });
    }
}
