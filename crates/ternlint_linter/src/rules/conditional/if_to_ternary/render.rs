//! Source text for a [`Replacement`].
//!
//! Statements are rendered from their original text with each substitution
//! target spliced out, so formatting and comments inside the then-branch
//! survive. Continuation lines are moved to the indentation of the `if`.

use ternlint_java_cst::{NodeId, SyntaxTree};
use ternlint_source_file::SourceCode;
use ternlint_text_size::{TextRange, TextSize};

use super::builder::{ConditionalExpr, Replacement, ReplacementStatement};

impl ConditionalExpr {
    pub fn render(&self, tree: &SyntaxTree) -> String {
        let condition = operand(tree, self.condition, self.wraps_condition(tree));
        let when_true = operand(
            tree,
            self.when_true,
            Self::wraps_operand(tree, self.when_true),
        );
        let when_false = operand(
            tree,
            self.when_false,
            Self::wraps_operand(tree, self.when_false),
        );

        let expr = format!("{condition} ? {when_true} : {when_false}");
        if self.wraps_whole() {
            format!("({expr})")
        } else {
            expr
        }
    }
}

fn operand(tree: &SyntaxTree, id: NodeId, wrap: bool) -> String {
    let text = tree.text(id);
    if wrap {
        format!("({text})")
    } else {
        text.to_string()
    }
}

impl ReplacementStatement {
    /// The statement's text with every substitution applied.
    pub fn render(&self, tree: &SyntaxTree) -> String {
        let source = tree.source();
        let range = tree.range(self.template);

        let mut out = String::with_capacity(range.len().to_usize() + 16);
        let mut cursor = range.start();
        for substitution in &self.substitutions {
            let target = tree.range(substitution.target);
            out.push_str(&source[TextRange::new(cursor, target.start())]);
            out.push_str(&substitution.expr.render(tree));
            cursor = target.end();
        }
        out.push_str(&source[TextRange::new(cursor, range.end())]);
        out
    }
}

impl Replacement {
    /// Source range the rendered text replaces: from the `if` to the end of
    /// the last removed statement.
    pub fn replaced_range(&self, tree: &SyntaxTree) -> TextRange {
        let start = tree.range(self.if_statement).start();
        let end = self
            .removals
            .iter()
            .map(|id| tree.range(*id).end())
            .max()
            .unwrap_or(start);
        TextRange::new(start, end)
    }

    /// Text replacing [`Replacement::replaced_range`].
    pub fn render(&self, tree: &SyntaxTree, source_code: &SourceCode) -> String {
        let if_indent = source_code.indentation_of(tree.range(self.if_statement).start());

        let mut out = String::new();
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                out.push('\n');
                out.push_str(if_indent);
            }
            let indent = source_code.indentation_of(tree.range(statement.template).start());
            out.push_str(&reindent(&statement.render(tree), indent, if_indent));
        }
        out
    }

    /// Whether `offset` lies inside one of the kept then-branch statements.
    pub fn keeps(&self, tree: &SyntaxTree, offset: TextSize) -> bool {
        self.statements
            .iter()
            .any(|statement| tree.range(statement.template).contains(offset))
    }
}

/// Swap the `from` prefix of every line but the first for `to`.
fn reindent(text: &str, from: &str, to: &str) -> String {
    if from == to || !text.contains('\n') {
        return text.to_string();
    }

    let mut lines = text.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        match line.strip_prefix(from) {
            Some(rest) => {
                out.push_str(to);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}
