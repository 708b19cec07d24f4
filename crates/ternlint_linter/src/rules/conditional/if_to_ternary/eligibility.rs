//! Positions where a conditional expression may stand in for any expression.

use std::cmp::Reverse;
use std::fmt;

use ternlint_java_cst::{NodeId, SyntaxKind, SyntaxTree};

use super::diff::DiffPair;

/// Grammatical position of an accepted substitution site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EligibleContext {
    /// Argument of a method call or constructor.
    Argument,
    /// Initializer of a variable declarator.
    Initializer,
    ReturnValue,
    YieldValue,
    /// Right operand of a binary operator other than `&&` and `||`.
    BinaryRightOperand,
    /// Right-hand side of a simple or compound assignment.
    AssignmentRight,
    /// Condition of a nested `if`.
    IfCondition,
}

impl fmt::Display for EligibleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Argument => "argument",
            Self::Initializer => "initializer",
            Self::ReturnValue => "return value",
            Self::YieldValue => "yield value",
            Self::BinaryRightOperand => "right operand",
            Self::AssignmentRight => "assigned value",
            Self::IfCondition => "if condition",
        };
        f.write_str(name)
    }
}

/// An accepted diff pair together with the position it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub before: NodeId,
    pub after: NodeId,
    pub context: EligibleContext,
}

/// The eligible context `id` sits in, judged from its parent and field role.
pub fn context_of(tree: &SyntaxTree, id: NodeId) -> Option<EligibleContext> {
    if tree.is_token(id) || !can_be_conditional(tree.kind(id)) {
        return None;
    }
    let parent = tree.parent(id)?;
    let field = tree.field(id);

    match tree.kind(parent) {
        SyntaxKind::ArgumentList => Some(EligibleContext::Argument),
        SyntaxKind::VariableDeclarator if field == Some("value") => {
            Some(EligibleContext::Initializer)
        }
        SyntaxKind::ReturnStatement => Some(EligibleContext::ReturnValue),
        SyntaxKind::YieldStatement => Some(EligibleContext::YieldValue),
        SyntaxKind::BinaryExpression
            if field == Some("right") && !is_short_circuit(tree, parent) =>
        {
            Some(EligibleContext::BinaryRightOperand)
        }
        SyntaxKind::AssignmentExpression if field == Some("right") => {
            Some(EligibleContext::AssignmentRight)
        }
        SyntaxKind::ParenthesizedExpression
            if tree.field(parent) == Some("condition")
                && tree
                    .parent(parent)
                    .is_some_and(|grand| tree.kind(grand) == SyntaxKind::IfStatement) =>
        {
            Some(EligibleContext::IfCondition)
        }
        _ => None,
    }
}

/// Kinds that sit in expression positions without being expressions.
fn can_be_conditional(kind: SyntaxKind) -> bool {
    !matches!(kind, SyntaxKind::Other("array_initializer"))
}

fn is_short_circuit(tree: &SyntaxTree, binary: NodeId) -> bool {
    tree.child_by_field(binary, "operator")
        .is_some_and(|op| matches!(tree.text(op), "&&" | "||"))
}

/// Climb every diff pair to its nearest eligible position.
///
/// `boundary_before` and `boundary_after` are the compared statements; a
/// climb that reaches them fails the whole classification. Sites nested in
/// (or equal to) another site are folded into the outer one. The result is
/// sorted by source position.
pub fn classify(
    tree: &SyntaxTree,
    diffs: &[DiffPair],
    boundary_before: NodeId,
    boundary_after: NodeId,
) -> Option<Vec<Site>> {
    let mut sites = Vec::with_capacity(diffs.len());
    for pair in diffs {
        let Some(site) = climb(tree, *pair, boundary_before, boundary_after) else {
            tracing::debug!(
                before = tree.text(pair.before),
                after = tree.text(pair.after),
                "difference has no eligible position"
            );
            return None;
        };
        sites.push(site);
    }
    Some(fold(tree, sites))
}

fn climb(
    tree: &SyntaxTree,
    pair: DiffPair,
    boundary_before: NodeId,
    boundary_after: NodeId,
) -> Option<Site> {
    let DiffPair {
        mut before,
        mut after,
    } = pair;

    if in_assignment_target(tree, before, boundary_before)
        || in_assignment_target(tree, after, boundary_after)
    {
        tracing::debug!(
            site = tree.text(before),
            "difference is inside an assignment target"
        );
        return None;
    }

    loop {
        if before == boundary_before || after == boundary_after {
            return None;
        }
        if tree.field(before) != tree.field(after) {
            return None;
        }
        if let Some(context) = context_of(tree, before) {
            if context_of(tree, after) != Some(context) {
                return None;
            }
            if crosses_scope(tree, before, boundary_before) {
                tracing::debug!(
                    site = tree.text(before),
                    "site is inside a lambda or class body"
                );
                return None;
            }
            return Some(Site {
                before,
                after,
                context,
            });
        }
        before = tree.parent(before)?;
        after = tree.parent(after)?;
    }
}

/// Whether `id` or an ancestor below `boundary` is the left-hand side of an
/// assignment. Assignment targets must match exactly.
fn in_assignment_target(tree: &SyntaxTree, id: NodeId, boundary: NodeId) -> bool {
    std::iter::once(id)
        .chain(tree.ancestors(id))
        .take_while(|node| *node != boundary)
        .any(|node| {
            tree.field(node) == Some("left")
                && tree
                    .parent(node)
                    .is_some_and(|parent| tree.kind(parent) == SyntaxKind::AssignmentExpression)
        })
}

/// Whether a lambda or class body lies between `site` and `boundary`; the
/// condition would then be evaluated in a different scope and at a different time.
fn crosses_scope(tree: &SyntaxTree, site: NodeId, boundary: NodeId) -> bool {
    tree.ancestors(site)
        .take_while(|ancestor| *ancestor != boundary)
        .any(|ancestor| {
            matches!(
                tree.kind(ancestor),
                SyntaxKind::LambdaExpression | SyntaxKind::Other("class_body")
            )
        })
}

fn fold(tree: &SyntaxTree, mut sites: Vec<Site>) -> Vec<Site> {
    sites.sort_by_key(|site| {
        let range = tree.range(site.before);
        (range.start(), Reverse(range.len()))
    });

    let mut kept: Vec<Site> = Vec::with_capacity(sites.len());
    for site in sites {
        if kept
            .iter()
            .any(|outer| tree.is_ancestor_or_self(outer.before, site.before))
        {
            continue;
        }
        kept.push(site);
    }
    kept
}
