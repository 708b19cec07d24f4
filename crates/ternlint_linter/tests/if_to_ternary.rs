//! Behaviour of the if-to-conditional rewrite engine and the IfToTernary rule.

use indoc::indoc;
use pretty_assertions::assert_eq;
use ternlint_java_cst::{NodeId, SyntaxTree, TreeWalker};
use ternlint_java_parser::JavaParser;
use ternlint_linter::rules::conditional::if_to_ternary::{
    EligibleContext, EngineError, PotentialRewrite, RewriteKind, classify_severity, diff,
    evaluate,
};
use ternlint_linter::{
    LintResult, PlainTextCommentFilterConfig, Rule, RuleRegistry, lint_source,
};
use ternlint_source_file::{LineIndex, SourceCode};
use ternlint_text_size::Ranged;

/// Everything a test needs to know about one evaluated `if`.
struct Evaluated {
    rewrite: PotentialRewrite,
    /// Rendered replacement text, when a rewrite is possible.
    rendered: Option<String>,
    /// Source text of the removed nodes.
    removed: Vec<String>,
    /// (before, after, context) of every site.
    sites: Vec<(String, String, EligibleContext)>,
}

/// Evaluate the first `if` statement in `body`, wrapped in a method.
fn evaluate_body(body: &str) -> Evaluated {
    let body: String = body
        .lines()
        .map(|line| format!("        {line}\n"))
        .collect();
    let source = format!("class T {{\n    Object m(boolean c) {{\n{body}    }}\n}}\n");
    evaluate_source(&source)
}

fn evaluate_source(source: &str) -> Evaluated {
    let mut parser = JavaParser::new();
    let result = parser.parse(source).unwrap();
    let if_node = TreeWalker::new(result.tree.root_node(), source)
        .find(|n| n.kind() == "if_statement")
        .expect("source contains an if statement");
    let tree = SyntaxTree::build(if_node.parent().unwrap().inner(), source);
    let if_id = tree.find(&if_node.inner()).unwrap();

    let rewrite = evaluate(&tree, if_id).unwrap();
    let index = LineIndex::from_source_text(source);
    let source_code = SourceCode::new(source, &index);

    let text = |id: NodeId| tree.text(id).to_string();
    let (rendered, removed, sites) = match rewrite.replacement() {
        Some(replacement) => (
            Some(replacement.render(&tree, &source_code)),
            replacement.removals.iter().map(|id| text(*id)).collect(),
            replacement
                .statements
                .iter()
                .flat_map(|statement| &statement.substitutions)
                .map(|s| (text(s.expr.when_true), text(s.expr.when_false), s.expr.context))
                .collect(),
        ),
        None => (None, Vec::new(), Vec::new()),
    };

    Evaluated {
        rewrite,
        rendered,
        removed,
        sites,
    }
}

fn site(before: &str, after: &str, context: EligibleContext) -> (String, String, EligibleContext) {
    (before.to_string(), after.to_string(), context)
}

fn lint(source: &str) -> LintResult {
    let rules: Vec<Box<dyn Rule>> = vec![
        RuleRegistry::builtin()
            .create_rule("IfToTernary", &Default::default())
            .unwrap(),
    ];
    lint_source(
        source,
        &rules,
        &[PlainTextCommentFilterConfig::ternlint_default()],
    )
    .unwrap()
}

#[test]
fn identical_branches_are_nothing_to_simplify() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            return "Foo";
        } else {
            return "Foo";
        }
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn identical_statement_trees_have_no_diffs() {
    let source = "class T { void m() { w(a, \"x\"); w(a, \"x\"); } }";
    let mut parser = JavaParser::new();
    let result = parser.parse(source).unwrap();
    let block = TreeWalker::new(result.tree.root_node(), source)
        .find(|n| n.kind() == "block")
        .unwrap();
    let tree = SyntaxTree::build(block.inner(), source);
    let statements: Vec<_> = tree.child_nodes(tree.root()).collect();

    assert!(diff::find(&tree, statements[0], statements[1]).is_empty());
}

#[test]
fn single_site_round_trip() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            return "Foo";
        } else {
            return "Bar";
        }
    "#});

    assert_eq!(
        evaluated.sites,
        vec![site(r#""Foo""#, r#""Bar""#, EligibleContext::ReturnValue)]
    );
    assert_eq!(evaluated.rendered.as_deref(), Some(r#"return c ? "Foo" : "Bar";"#));

    let replacement = evaluated.rewrite.replacement().unwrap();
    assert_eq!(replacement.ternary_count, 1);
    assert_eq!(classify_severity(replacement), RewriteKind::Simple);
}

#[test]
fn different_called_members_fail_closed() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            Console.Write("Foo");
        } else {
            Console.WriteLine("Foo");
        }
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn different_assignment_targets_fail_closed() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            a = 1;
        } else {
            b = 1;
        }
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn virtual_else_borrows_trailing_statement() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            return 1;
        }
        return 2;
    "#});

    assert_eq!(evaluated.rendered.as_deref(), Some("return c ? 1 : 2;"));
    assert_eq!(evaluated.removed.len(), 2);
    assert_eq!(evaluated.removed[1], "return 2;");

    let replacement = evaluated.rewrite.replacement().unwrap();
    assert_eq!(replacement.borrowed().len(), 1);
}

#[test]
fn virtual_else_after_throw() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            throw new IllegalStateException("a");
        }
        throw new IllegalStateException("b");
    "#});

    assert_eq!(
        evaluated.sites,
        vec![site(r#""a""#, r#""b""#, EligibleContext::Argument)]
    );
    assert_eq!(
        evaluated.rendered.as_deref(),
        Some(r#"throw new IllegalStateException(c ? "a" : "b");"#)
    );
    assert_eq!(evaluated.removed.len(), 2);
}

#[test]
fn virtual_else_after_break_in_loop() {
    let evaluated = evaluate_body(indoc! {r#"
        while (true) {
            if (c) {
                log(1);
                break;
            }
            log(2);
            break;
        }
    "#});

    assert_eq!(
        evaluated.rendered.as_deref(),
        Some("log(c ? 1 : 2);\n            break;")
    );
    assert_eq!(
        evaluated.removed,
        vec![
            "if (c) {\n                log(1);\n                break;\n            }".to_string(),
            "log(2);".to_string(),
            "break;".to_string(),
        ]
    );
}

#[test]
fn yield_value_in_switch_expression() {
    let evaluated = evaluate_source(indoc! {r#"
        class T {
            int m(int k, boolean c) {
                return switch (k) {
                    default -> {
                        if (c) {
                            yield 1;
                        }
                        yield 2;
                    }
                };
            }
        }
    "#});

    assert_eq!(
        evaluated.sites,
        vec![site("1", "2", EligibleContext::YieldValue)]
    );
    assert_eq!(evaluated.rendered.as_deref(), Some("yield c ? 1 : 2;"));
    let replacement = evaluated.rewrite.replacement().unwrap();
    assert_eq!(classify_severity(replacement), RewriteKind::Simple);
}

#[test]
fn array_initializers_are_not_expressions() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            int[] a = {1};
            use(a);
        } else {
            int[] a = {2};
            use(a);
        }
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn difference_inside_assignment_target_fails_closed() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            arr[f(a)] = 1;
        } else {
            arr[f(b)] = 1;
        }
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn virtual_else_needs_enough_statements() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            log(1);
            return 1;
        }
        return 2;
    "#});
    assert_eq!(evaluated.rewrite, PotentialRewrite::NoReplacement);
}

#[test]
fn two_independent_sites() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            Console.WriteLine(a, "XX");
        } else {
            Console.WriteLine("YY", b);
        }
    "#});

    assert_eq!(
        evaluated.sites,
        vec![
            site("a", r#""YY""#, EligibleContext::Argument),
            site(r#""XX""#, "b", EligibleContext::Argument),
        ]
    );
    assert_eq!(
        evaluated.rendered.as_deref(),
        Some(r#"Console.WriteLine(c ? a : "YY", c ? "XX" : b);"#)
    );

    let replacement = evaluated.rewrite.replacement().unwrap();
    assert_eq!(replacement.ternary_count, 2);
    assert_eq!(classify_severity(replacement), RewriteKind::Complex);
}

#[test]
fn nested_conditional_operands_are_parenthesized() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            return d ? 1 : 2;
        } else {
            return 3;
        }
    "#});
    assert_eq!(
        evaluated.rendered.as_deref(),
        Some("return c ? (d ? 1 : 2) : 3;")
    );
}

#[test]
fn conditional_condition_is_parenthesized() {
    let evaluated = evaluate_body(indoc! {r#"
        if (a ? b : d) {
            return 1;
        } else {
            return 2;
        }
    "#});
    assert_eq!(
        evaluated.rendered.as_deref(),
        Some("return (a ? b : d) ? 1 : 2;")
    );
}

#[test]
fn binary_right_operand_is_wrapped() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            return base + 1;
        } else {
            return base + 2;
        }
    "#});
    assert_eq!(
        evaluated.rendered.as_deref(),
        Some("return base + (c ? 1 : 2);")
    );
}

#[test]
fn multiple_statements_keep_indentation() {
    let evaluated = evaluate_body(indoc! {r#"
        if (c) {
            x = 1;
            y = "a";
        } else {
            x = 2;
            y = "b";
        }
    "#});

    assert_eq!(
        evaluated.rendered.as_deref(),
        Some("x = c ? 1 : 2;\n        y = c ? \"a\" : \"b\";")
    );
    let replacement = evaluated.rewrite.replacement().unwrap();
    assert_eq!(classify_severity(replacement), RewriteKind::Complex);
}

#[test]
fn engine_rejects_non_if_nodes() {
    let source = "class T { void m() { foo(); } }";
    let mut parser = JavaParser::new();
    let result = parser.parse(source).unwrap();
    let tree = SyntaxTree::build(result.tree.root_node(), source);

    assert_eq!(
        evaluate(&tree, tree.root()),
        Err(EngineError::NotAnIfStatement("program"))
    );
}

#[test]
fn lint_source_reports_and_fixes() {
    let source = indoc! {r#"
        class T {
            int pick(boolean c) {
                if (c) {
                    return 1;
                }
                return 2;
            }
        }
    "#};

    let result = lint(source);
    assert!(!result.had_parse_errors);
    assert_eq!(result.diagnostics.len(), 1);

    let finding = &result.diagnostics[0];
    assert_eq!(finding.rule, "IfToTernary");
    let edit = &finding.diagnostic.fix.as_ref().unwrap().edits()[0];

    let mut fixed = source.to_string();
    fixed.replace_range(
        edit.range().start().to_usize()..edit.range().end().to_usize(),
        edit.content().unwrap(),
    );
    assert_eq!(
        fixed,
        indoc! {r#"
            class T {
                int pick(boolean c) {
                    return c ? 1 : 2;
                }
            }
        "#}
    );
}

#[test]
fn lint_source_honours_suppressions() {
    let source = indoc! {r#"
        class T {
            @SuppressWarnings("ternlint:IfToTernary")
            int a(boolean c) {
                if (c) { return 1; } else { return 2; }
            }

            int b(boolean c) {
                // ternlint:off:IfToTernary
                if (c) { return 1; } else { return 2; }
                // ternlint:on:IfToTernary
            }

            int d(boolean c) {
                if (c) { return 1; } else { return 2; }
            }
        }
    "#};

    let result = lint(source);
    assert_eq!(result.diagnostics.len(), 1);
    let start = result.diagnostics[0].diagnostic.range.start().to_usize();
    assert!(start > source.find("int d").unwrap());
}
