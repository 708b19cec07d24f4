//! Replacement statements with conditional expressions at every site.

use ternlint_java_cst::{NodeId, SyntaxKind, SyntaxTree};

use super::eligibility::{EligibleContext, Site};

/// `condition ? when_true : when_false`, built from nodes of the original tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalExpr {
    /// The `if` condition without its parentheses.
    pub condition: NodeId,
    pub when_true: NodeId,
    pub when_false: NodeId,
    /// Position the expression is substituted into.
    pub context: EligibleContext,
}

impl ConditionalExpr {
    /// Whether the condition must be parenthesized.
    pub fn wraps_condition(&self, tree: &SyntaxTree) -> bool {
        needs_parentheses(tree.kind(self.condition))
    }

    /// Whether an operand must be parenthesized.
    pub fn wraps_operand(tree: &SyntaxTree, operand: NodeId) -> bool {
        needs_parentheses(tree.kind(operand))
    }

    /// Whether the whole expression must be parenthesized at its site.
    pub fn wraps_whole(&self) -> bool {
        self.context == EligibleContext::BinaryRightOperand
    }
}

/// Expressions binding looser than `?:` operands.
fn needs_parentheses(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::TernaryExpression
            | SyntaxKind::AssignmentExpression
            | SyntaxKind::LambdaExpression
    )
}

/// One conditional expression replacing the subtree `target`.
///
/// `target` is a handle into the original tree; substitutions never
/// invalidate each other because nothing is rewritten in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Substitution {
    pub target: NodeId,
    pub expr: ConditionalExpr,
}

/// A then-branch statement with its substitutions, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementStatement {
    pub template: NodeId,
    pub substitutions: Vec<Substitution>,
}

/// The full rewrite of one `if` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub if_statement: NodeId,
    /// Statements that take the place of the `if`, in order.
    pub statements: Vec<ReplacementStatement>,
    /// Number of conditional expressions created.
    pub ternary_count: usize,
    /// Nodes to remove: the `if` itself, then any borrowed statements.
    pub removals: Vec<NodeId>,
}

impl Replacement {
    /// Statements borrowed as a virtual else.
    pub fn borrowed(&self) -> &[NodeId] {
        self.removals.get(1..).unwrap_or_default()
    }
}

/// Assemble the replacement for `if_statement`.
///
/// `condition` is the `if`'s parenthesized condition. Every site must lie
/// inside one of `then_statements`.
pub fn build(
    tree: &SyntaxTree,
    if_statement: NodeId,
    condition: NodeId,
    sites: &[Site],
    then_statements: &[NodeId],
    borrowed: &[NodeId],
) -> Replacement {
    let condition = tree.child_nodes(condition).next().unwrap_or(condition);

    let statements: Vec<_> = then_statements
        .iter()
        .map(|&template| ReplacementStatement {
            template,
            substitutions: sites
                .iter()
                .filter(|site| tree.is_ancestor_or_self(template, site.before))
                .map(|site| Substitution {
                    target: site.before,
                    expr: ConditionalExpr {
                        condition,
                        when_true: site.before,
                        when_false: site.after,
                        context: site.context,
                    },
                })
                .collect(),
        })
        .collect();

    let ternary_count = statements.iter().map(|s| s.substitutions.len()).sum();

    let mut removals = Vec::with_capacity(borrowed.len() + 1);
    removals.push(if_statement);
    removals.extend_from_slice(borrowed);

    Replacement {
        if_statement,
        statements,
        ternary_count,
        removals,
    }
}
