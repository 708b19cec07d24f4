//! Arena representation of a Java subtree.
//!
//! A [`SyntaxTree`] is built once from a tree-sitter node and never mutated.
//! Every element is addressed by a [`NodeId`]; parents are plain ids, so
//! holding an id never borrows the tree and ids stay valid for as long as the
//! tree lives.
//!
//! Lowering rules:
//! - comments and other extras are dropped from the node structure; comment
//!   ranges are kept separately;
//! - anonymous leaves (keywords, punctuation, operators) and string
//!   fragments become tokens;
//! - named leaves such as identifiers and literals become a node of the same
//!   kind wrapping a single token, so that they can be compared and replaced
//!   as expressions.

use std::collections::HashMap;
use std::fmt;

use ternlint_text_size::TextRange;
use tree_sitter::Node;

use crate::node_range;

/// Stable handle of an element in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The grammar subset that analyses inspect. Everything else is `Other`,
/// carrying the tree-sitter kind name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Statements
    IfStatement,
    Block,
    ReturnStatement,
    YieldStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    ExpressionStatement,
    LocalVariableDeclaration,
    SwitchBlockStatementGroup,

    // Expressions and their parts
    VariableDeclarator,
    AssignmentExpression,
    BinaryExpression,
    TernaryExpression,
    ParenthesizedExpression,
    UnaryExpression,
    LambdaExpression,
    MethodInvocation,
    ArgumentList,
    FieldAccess,
    ArrayAccess,
    CastExpression,
    ObjectCreationExpression,

    // Leaves
    Identifier,
    TypeIdentifier,
    IntegerLiteral,
    FloatingPointLiteral,
    CharacterLiteral,
    StringLiteral,
    StringFragment,
    EscapeSequence,
    True,
    False,
    NullLiteral,
    This,

    Other(&'static str),
}

impl SyntaxKind {
    /// Map a tree-sitter-java kind name.
    pub fn from_ts(kind: &'static str) -> Self {
        match kind {
            "if_statement" => Self::IfStatement,
            "block" => Self::Block,
            "return_statement" => Self::ReturnStatement,
            "yield_statement" => Self::YieldStatement,
            "throw_statement" => Self::ThrowStatement,
            "break_statement" => Self::BreakStatement,
            "continue_statement" => Self::ContinueStatement,
            "expression_statement" => Self::ExpressionStatement,
            "local_variable_declaration" => Self::LocalVariableDeclaration,
            "switch_block_statement_group" => Self::SwitchBlockStatementGroup,
            "variable_declarator" => Self::VariableDeclarator,
            "assignment_expression" => Self::AssignmentExpression,
            "binary_expression" => Self::BinaryExpression,
            "ternary_expression" => Self::TernaryExpression,
            "parenthesized_expression" => Self::ParenthesizedExpression,
            "unary_expression" => Self::UnaryExpression,
            "lambda_expression" => Self::LambdaExpression,
            "method_invocation" => Self::MethodInvocation,
            "argument_list" => Self::ArgumentList,
            "field_access" => Self::FieldAccess,
            "array_access" => Self::ArrayAccess,
            "cast_expression" => Self::CastExpression,
            "object_creation_expression" => Self::ObjectCreationExpression,
            "identifier" => Self::Identifier,
            "type_identifier" => Self::TypeIdentifier,
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => Self::IntegerLiteral,
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                Self::FloatingPointLiteral
            }
            "character_literal" => Self::CharacterLiteral,
            "string_literal" => Self::StringLiteral,
            "string_fragment" | "multiline_string_fragment" => Self::StringFragment,
            "escape_sequence" => Self::EscapeSequence,
            "true" => Self::True,
            "false" => Self::False,
            "null_literal" => Self::NullLiteral,
            "this" => Self::This,
            other => Self::Other(other),
        }
    }

    /// Kinds whose tokens are only equal when their source text is equal.
    pub fn carries_payload(self) -> bool {
        matches!(
            self,
            Self::Identifier
                | Self::TypeIdentifier
                | Self::IntegerLiteral
                | Self::FloatingPointLiteral
                | Self::CharacterLiteral
                | Self::StringLiteral
                | Self::StringFragment
                | Self::EscapeSequence
        )
    }

    /// Statements after which control never falls through to the next statement.
    pub fn is_jump_statement(self) -> bool {
        matches!(
            self,
            Self::ReturnStatement
                | Self::YieldStatement
                | Self::ThrowStatement
                | Self::BreakStatement
                | Self::ContinueStatement
        )
    }

    /// Containers whose named children form a statement sequence.
    pub fn is_statement_container(self) -> bool {
        matches!(self, Self::Block | Self::SwitchBlockStatementGroup)
    }

    /// Leaves that stay bare tokens even when tree-sitter names them.
    fn is_fragment(self) -> bool {
        matches!(self, Self::StringFragment | Self::EscapeSequence)
    }
}

/// Whether an arena element is a leaf token or an interior node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Token { named: bool },
    Node { children: Vec<NodeId> },
}

/// One element of a [`SyntaxTree`].
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    /// The tree-sitter kind name.
    pub raw_kind: &'static str,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    /// The grammar field through which the parent holds this element.
    pub field: Option<&'static str>,
    pub element: Element,
}

impl SyntaxNode {
    pub fn is_token(&self) -> bool {
        matches!(self.element, Element::Token { .. })
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.element {
            Element::Node { children } => children,
            Element::Token { .. } => &[],
        }
    }
}

/// Immutable arena of a lowered Java subtree.
#[derive(Debug)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    nodes: Vec<SyntaxNode>,
    root: NodeId,
    by_ts_id: HashMap<usize, NodeId>,
    comments: Vec<TextRange>,
}

impl<'src> SyntaxTree<'src> {
    /// Lower `root` and everything below it.
    pub fn build(root: Node<'_>, source: &'src str) -> Self {
        let mut tree = Self {
            source,
            nodes: Vec::new(),
            root: NodeId(0),
            by_ts_id: HashMap::new(),
            comments: Vec::new(),
        };
        tree.root = tree.lower(root, None, None);
        tree
    }

    fn lower(
        &mut self,
        node: Node<'_>,
        parent: Option<NodeId>,
        field: Option<&'static str>,
    ) -> NodeId {
        let raw_kind = node.kind();
        let kind = SyntaxKind::from_ts(raw_kind);
        let range = node_range(&node);

        if node.child_count() == 0 {
            if node.is_named() && !kind.is_fragment() {
                let wrapper = self.alloc(
                    kind,
                    raw_kind,
                    range,
                    parent,
                    field,
                    Element::Node {
                        children: Vec::new(),
                    },
                );
                let token = self.alloc(
                    kind,
                    raw_kind,
                    range,
                    Some(wrapper),
                    None,
                    Element::Token { named: true },
                );
                self.set_children(wrapper, vec![token]);
                self.by_ts_id.insert(node.id(), wrapper);
                return wrapper;
            }

            let token = self.alloc(
                kind,
                raw_kind,
                range,
                parent,
                field,
                Element::Token {
                    named: node.is_named(),
                },
            );
            self.by_ts_id.insert(node.id(), token);
            return token;
        }

        let id = self.alloc(
            kind,
            raw_kind,
            range,
            parent,
            field,
            Element::Node {
                children: Vec::new(),
            },
        );
        self.by_ts_id.insert(node.id(), id);

        let mut children = Vec::with_capacity(node.child_count());
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_extra() {
                    if child.kind().ends_with("comment") {
                        self.comments.push(node_range(&child));
                    }
                } else {
                    let child_field = cursor.field_name();
                    children.push(self.lower(child, Some(id), child_field));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        self.set_children(id, children);
        id
    }

    fn alloc(
        &mut self,
        kind: SyntaxKind,
        raw_kind: &'static str,
        range: TextRange,
        parent: Option<NodeId>,
        field: Option<&'static str>,
        element: Element,
    ) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(SyntaxNode {
            kind,
            raw_kind,
            range,
            parent,
            field,
            element,
        });
        id
    }

    fn set_children(&mut self, id: NodeId, new_children: Vec<NodeId>) {
        if let Element::Node { children } = &mut self.nodes[id.index()].element {
            *children = new_children;
        }
    }

    /// The arena id of a tree-sitter node that was lowered into this tree.
    pub fn find(&self, node: &Node<'_>) -> Option<NodeId> {
        self.by_ts_id.get(&node.id()).copied()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checked access, for ids that did not come from this tree.
    pub fn get(&self, id: NodeId) -> Option<&SyntaxNode> {
        self.nodes.get(id.index())
    }

    /// # Panics
    ///
    /// Panics if `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn field(&self, id: NodeId) -> Option<&'static str> {
        self.node(id).field
    }

    pub fn is_token(&self, id: NodeId) -> bool {
        self.node(id).is_token()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).children()
    }

    /// Children that are nodes rather than tokens.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| !self.is_token(*child))
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.field(*child) == Some(field))
    }

    /// Source text covered by `id`.
    pub fn text(&self, id: NodeId) -> &'src str {
        &self.source[self.range(id)]
    }

    /// Comments inside the lowered subtree, in source order.
    pub fn comments(&self) -> &[TextRange] {
        &self.comments
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |current| self.parent(*current))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        ancestor == id || self.ancestors(id).any(|a| a == ancestor)
    }

    /// Node siblings that follow `id` in its parent, in order.
    pub fn following_siblings(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let siblings = self.parent(id).map_or(&[][..], |parent| self.children(parent));
        let position = siblings.iter().position(|sibling| *sibling == id);
        siblings
            .iter()
            .skip(position.map_or(siblings.len(), |p| p + 1))
            .copied()
            .filter(|sibling| !self.is_token(*sibling))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeWalker;
    use ternlint_java_parser::JavaParser;

    fn with_tree(source: &str, f: impl FnOnce(&SyntaxTree, NodeId)) {
        let mut parser = JavaParser::new();
        let result = parser.parse(source).unwrap();
        let if_node = TreeWalker::new(result.tree.root_node(), source)
            .find(|n| n.kind() == "if_statement")
            .expect("if statement");
        let block = if_node.parent().unwrap();
        let tree = SyntaxTree::build(block.inner(), source);
        let if_id = tree.find(&if_node.inner()).unwrap();
        f(&tree, if_id);
    }

    #[test]
    fn test_lowering_fields_and_parents() {
        let source = "class A { int m(boolean c) { if (c) { return 1; } return 2; } }";
        with_tree(source, |tree, if_id| {
            assert_eq!(tree.kind(if_id), SyntaxKind::IfStatement);
            assert_eq!(tree.kind(tree.root()), SyntaxKind::Block);
            assert_eq!(tree.parent(if_id), Some(tree.root()));

            let condition = tree.child_by_field(if_id, "condition").unwrap();
            assert_eq!(tree.kind(condition), SyntaxKind::ParenthesizedExpression);
            assert_eq!(tree.text(condition), "(c)");

            let consequence = tree.child_by_field(if_id, "consequence").unwrap();
            assert_eq!(tree.kind(consequence), SyntaxKind::Block);
            assert!(tree.child_by_field(if_id, "alternative").is_none());
        });
    }

    #[test]
    fn test_named_leaves_are_wrapped() {
        let source = "class A { int m(boolean c) { if (c) { return 1; } return 2; } }";
        with_tree(source, |tree, if_id| {
            let condition = tree.child_by_field(if_id, "condition").unwrap();
            let ident = tree
                .child_nodes(condition)
                .next()
                .expect("identifier inside parentheses");
            assert_eq!(tree.kind(ident), SyntaxKind::Identifier);
            assert!(!tree.is_token(ident));

            let children = tree.children(ident);
            assert_eq!(children.len(), 1);
            assert!(tree.is_token(children[0]));
            assert_eq!(tree.text(children[0]), "c");
        });
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "class A { int m(boolean c) { if (c) { /* one */ return 1; } return 2; } }";
        with_tree(source, |tree, if_id| {
            let consequence = tree.child_by_field(if_id, "consequence").unwrap();
            let statements: Vec<_> = tree.child_nodes(consequence).collect();
            assert_eq!(statements.len(), 1);
            assert_eq!(tree.kind(statements[0]), SyntaxKind::ReturnStatement);
            assert_eq!(tree.comments().len(), 1);
            assert_eq!(&tree.source()[tree.comments()[0]], "/* one */");
        });
    }

    #[test]
    fn test_following_siblings() {
        let source = "class A { int m(boolean c) { foo(); if (c) { return 1; } bar(); return 2; } }";
        with_tree(source, |tree, if_id| {
            let texts: Vec<_> = tree
                .following_siblings(if_id)
                .map(|id| tree.text(id))
                .collect();
            assert_eq!(texts, vec!["bar();", "return 2;"]);
            assert!(tree.is_ancestor_or_self(tree.root(), if_id));
            assert!(!tree.is_ancestor_or_self(if_id, tree.root()));
        });
    }
}
