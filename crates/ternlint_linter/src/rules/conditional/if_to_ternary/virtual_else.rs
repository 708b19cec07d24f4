//! Implicit else branches borrowed from the statements after an `if`.
//!
//! `if (c) { return a; } return b;` behaves like an `if` with an `else`
//! holding `return b;`, as long as the then-branch cannot fall through.

use ternlint_java_cst::{NodeId, SyntaxTree};

/// Statements following an `if` that act as its else branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualElse {
    /// Borrowed sibling statements, in order. They are removed by the rewrite.
    pub statements: Vec<NodeId>,
}

/// Borrow the next `then_statements.len()` siblings of `if_statement`.
///
/// Returns `None` when the `if` already has an else, is not directly inside a
/// statement sequence, has a then-branch that may complete normally, or is
/// followed by too few statements.
pub fn synthesize_else(
    tree: &SyntaxTree,
    if_statement: NodeId,
    then_statements: &[NodeId],
) -> Option<VirtualElse> {
    if tree.child_by_field(if_statement, "alternative").is_some() {
        return None;
    }

    let parent = tree.parent(if_statement)?;
    if !tree.kind(parent).is_statement_container() {
        return None;
    }

    let last = *then_statements.last()?;
    if !tree.kind(last).is_jump_statement() {
        tracing::debug!("then-branch can complete normally, no virtual else");
        return None;
    }

    let wanted = then_statements.len();
    let statements: Vec<_> = tree.following_siblings(if_statement).take(wanted).collect();
    if statements.len() < wanted {
        tracing::debug!(
            wanted,
            found = statements.len(),
            "too few statements after the if"
        );
        return None;
    }

    Some(VirtualElse { statements })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ternlint_java_cst::TreeWalker;
    use ternlint_java_parser::JavaParser;

    fn borrowed(source: &str) -> Option<Vec<String>> {
        let mut parser = JavaParser::new();
        let result = parser.parse(source).unwrap();
        let if_node = TreeWalker::new(result.tree.root_node(), source)
            .find(|n| n.kind() == "if_statement")
            .unwrap();
        let parent = if_node.parent().unwrap();
        let tree = SyntaxTree::build(parent.inner(), source);
        let if_id = tree.find(&if_node.inner()).unwrap();

        let consequence = tree.child_by_field(if_id, "consequence").unwrap();
        let then_statements: Vec<_> = if tree.kind(consequence).is_statement_container() {
            tree.child_nodes(consequence).collect()
        } else {
            vec![consequence]
        };

        synthesize_else(&tree, if_id, &then_statements).map(|virtual_else| {
            virtual_else
                .statements
                .iter()
                .map(|id| tree.text(*id).to_string())
                .collect()
        })
    }

    #[test]
    fn test_borrows_following_return() {
        let source = "class T { int m(boolean c) { if (c) { return 1; } return 2; } }";
        assert_eq!(borrowed(source), Some(vec!["return 2;".to_string()]));
    }

    #[test]
    fn test_borrows_exactly_n_statements() {
        let source = "class T { void m(boolean c) { \
             if (c) { log(1); return; } log(2); return; log(3); } }";
        assert_eq!(
            borrowed(source),
            Some(vec!["log(2);".to_string(), "return;".to_string()])
        );
    }

    #[test]
    fn test_single_statement_then_branch() {
        let source = "class T { int m(boolean c) { if (c) return 1; return 2; } }";
        assert_eq!(borrowed(source), Some(vec!["return 2;".to_string()]));
    }

    #[test]
    fn test_too_few_followers() {
        let source = "class T { void m(boolean c) { if (c) { log(1); return; } log(2); } }";
        assert_eq!(borrowed(source), None);
    }

    #[test]
    fn test_explicit_else() {
        let source = "class T { int m(boolean c) { if (c) { return 1; } else { return 3; } return 2; } }";
        assert_eq!(borrowed(source), None);
    }

    #[test]
    fn test_fall_through_then_branch() {
        let source = "class T { void m(boolean c) { if (c) { x = 1; } x = 2; } }";
        assert_eq!(borrowed(source), None);
    }

    #[test]
    fn test_switch_group() {
        let source = "class T { int m(int k, boolean c) { switch (k) { case 1: if (c) break; break; default: return 0; } return 1; } }";
        assert_eq!(borrowed(source), Some(vec!["break;".to_string()]));
    }

    #[test]
    fn test_not_in_statement_sequence() {
        let source = "class T { void m(boolean c) { while (true) if (c) break; } }";
        assert_eq!(borrowed(source), None);
    }
}
