//! Structural comparison of two subtrees.

use ternlint_java_cst::{Element, NodeId, SyntaxTree};

/// Corresponding positions at which two compared subtrees disagree.
///
/// Both sides are always nodes; a token mismatch is reported at the
/// nearest enclosing node pair because tokens cannot be replaced on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffPair {
    pub before: NodeId,
    pub after: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Equivalent,
    /// At least one diff pair was recorded below this pair.
    Recorded,
    /// Tokens differ; the caller must record its own pair.
    TokenMismatch,
}

/// Find the positions at which `before` and `after` diverge, in document order.
///
/// An empty result means the two subtrees are interchangeable as written.
pub fn find(tree: &SyntaxTree, before: NodeId, after: NodeId) -> Vec<DiffPair> {
    let mut diffs = Vec::new();
    if compare(tree, before, after, &mut diffs) == Outcome::TokenMismatch
        && let (Some(before), Some(after)) = (tree.parent(before), tree.parent(after))
    {
        diffs.push(DiffPair { before, after });
    }
    diffs
}

fn compare(tree: &SyntaxTree, before: NodeId, after: NodeId, diffs: &mut Vec<DiffPair>) -> Outcome {
    if before == after {
        return Outcome::Equivalent;
    }

    let left = tree.node(before);
    let right = tree.node(after);

    match (&left.element, &right.element) {
        (Element::Token { named }, Element::Token { .. }) => {
            if left.raw_kind != right.raw_kind {
                return Outcome::TokenMismatch;
            }
            let by_payload = *named || left.kind.carries_payload();
            if by_payload && tree.text(before) != tree.text(after) {
                return Outcome::TokenMismatch;
            }
            Outcome::Equivalent
        }
        (
            Element::Node {
                children: left_children,
            },
            Element::Node {
                children: right_children,
            },
        ) => {
            if left.raw_kind != right.raw_kind || left_children.len() != right_children.len() {
                diffs.push(DiffPair { before, after });
                return Outcome::Recorded;
            }

            let mark = diffs.len();
            let mut outcome = Outcome::Equivalent;
            for (&left_child, &right_child) in left_children.iter().zip(right_children) {
                match compare(tree, left_child, right_child, diffs) {
                    Outcome::TokenMismatch => {
                        diffs.truncate(mark);
                        diffs.push(DiffPair { before, after });
                        return Outcome::Recorded;
                    }
                    Outcome::Recorded => outcome = Outcome::Recorded,
                    Outcome::Equivalent => {}
                }
            }
            outcome
        }
        // A token facing a node is a shape mismatch that only the parent can record.
        _ => Outcome::TokenMismatch,
    }
}
