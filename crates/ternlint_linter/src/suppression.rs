//! Suppression support for ternlint.
//!
//! Supported forms:
//! - `// ternlint:off:RuleName` / `// ternlint:on:RuleName` comments
//! - `/* ternlint:off */` block comments, which silence every rule
//! - `@SuppressWarnings("ternlint:RuleName")` annotations
//!
//! Suppressions work by tracking ranges where specific rules are disabled.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use ternlint_java_cst::CstNode;
use ternlint_text_size::TextSize;

/// Prefix of `@SuppressWarnings` values that name ternlint rules.
const ANNOTATION_PREFIX: &str = "ternlint:";

/// Key of regions that apply to every rule.
const ALL_RULES: &str = "*";

lazy_static! {
    static ref DEFAULT_OFF: Regex = Regex::new(r"ternlint:off(?::(\w+))?").unwrap();
    static ref DEFAULT_ON: Regex = Regex::new(r"ternlint:on(?::(\w+))?").unwrap();
}

/// A suppression region where a specific rule is disabled.
#[derive(Debug, Clone)]
pub struct SuppressionRegion {
    /// The rule name being suppressed (or "*" for all rules).
    pub rule: String,
    /// Start offset in the source.
    pub start: TextSize,
    /// End offset in the source (None means until end of file).
    pub end: Option<TextSize>,
}

impl SuppressionRegion {
    fn contains(&self, pos: TextSize) -> bool {
        pos >= self.start && self.end.is_none_or(|end| pos < end)
    }
}

/// Configuration for a plain text comment filter.
#[derive(Debug, Clone)]
pub struct PlainTextCommentFilterConfig {
    /// Regex pattern for "off" comments.
    pub off_pattern: Regex,
    /// Regex pattern for "on" comments.
    pub on_pattern: Regex,
    /// Capture group index for the rule name (1-indexed, 0 means no capture).
    pub check_format_group: usize,
}

impl PlainTextCommentFilterConfig {
    /// Create a new filter from regex sources.
    ///
    /// - `off_comment_format`: Regex for off comments, e.g., `@suppress:(\w+)`
    /// - `on_comment_format`: Regex for on comments, e.g., `@unsuppress:(\w+)`
    /// - `check_format`: Which capture group names the rule, e.g., `$1`
    pub fn new(
        off_comment_format: &str,
        on_comment_format: &str,
        check_format: Option<&str>,
    ) -> Option<Self> {
        let off_pattern = Regex::new(off_comment_format).ok()?;
        let on_pattern = Regex::new(on_comment_format).ok()?;

        // "$1" means first capture group, "$2" means second, etc.
        let check_format_group = check_format
            .and_then(|fmt| fmt.strip_prefix('$').and_then(|s| s.parse::<usize>().ok()))
            .unwrap_or(0);

        Some(Self {
            off_pattern,
            on_pattern,
            check_format_group,
        })
    }

    /// The built-in `ternlint:off[:Rule]` / `ternlint:on[:Rule]` filter.
    pub fn ternlint_default() -> Self {
        Self {
            off_pattern: DEFAULT_OFF.clone(),
            on_pattern: DEFAULT_ON.clone(),
            check_format_group: 1,
        }
    }

    fn rule_of(&self, pattern: &Regex, comment: &str) -> Option<String> {
        let captures = pattern.captures(comment)?;
        let rule = if self.check_format_group > 0 {
            captures
                .get(self.check_format_group)
                .map_or_else(|| ALL_RULES.to_string(), |m| m.as_str().to_string())
        } else {
            ALL_RULES.to_string()
        };
        Some(rule)
    }
}

/// Manages suppressions for a source file.
#[derive(Debug, Default)]
pub struct SuppressionContext {
    /// Suppression regions indexed by rule name.
    /// Key "*" matches all rules.
    regions: HashMap<String, Vec<SuppressionRegion>>,
}

impl SuppressionContext {
    /// Create a new empty suppression context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse suppressions from source code using the given filter configs.
    pub fn from_source(source: &str, filters: &[PlainTextCommentFilterConfig]) -> Self {
        let mut ctx = Self::new();

        for filter in filters {
            ctx.parse_with_filter(source, filter);
        }

        ctx
    }

    /// Parse suppressions using a specific filter configuration.
    fn parse_with_filter(&mut self, source: &str, filter: &PlainTextCommentFilterConfig) {
        // Open suppressions: rule -> start offset
        let mut open_suppressions: HashMap<String, TextSize> = HashMap::new();

        let bytes = source.as_bytes();
        let mut pos = 0;
        while pos < bytes.len() {
            if bytes[pos] == b'"' {
                pos = skip_string(bytes, pos);
                continue;
            }

            if bytes[pos..].starts_with(b"//") {
                let line_end = memchr_newline(bytes, pos);
                self.process_comment(
                    &source[pos..line_end],
                    offset(pos),
                    filter,
                    &mut open_suppressions,
                );
                pos = line_end + 1;
                continue;
            }

            if bytes[pos..].starts_with(b"/*") {
                let Some(close) = find_block_end(bytes, pos + 2) else {
                    // Unclosed comment
                    break;
                };
                self.process_comment(
                    &source[pos..close],
                    offset(pos),
                    filter,
                    &mut open_suppressions,
                );
                pos = close;
                continue;
            }

            pos += 1;
        }

        // Close any remaining open suppressions at end of file
        let end_pos = offset(source.len());
        for (rule, start) in open_suppressions {
            self.add_region(SuppressionRegion {
                rule,
                start,
                end: Some(end_pos),
            });
        }
    }

    /// Process a single comment for suppression directives.
    fn process_comment(
        &mut self,
        comment: &str,
        comment_pos: TextSize,
        filter: &PlainTextCommentFilterConfig,
        open_suppressions: &mut HashMap<String, TextSize>,
    ) {
        if let Some(rule) = filter.rule_of(&filter.off_pattern, comment) {
            open_suppressions.entry(rule).or_insert(comment_pos);
        }

        if let Some(rule) = filter.rule_of(&filter.on_pattern, comment)
            && let Some(start) = open_suppressions.remove(&rule)
        {
            self.add_region(SuppressionRegion {
                rule,
                start,
                end: Some(comment_pos),
            });
        }
    }

    fn add_region(&mut self, region: SuppressionRegion) {
        self.regions
            .entry(region.rule.clone())
            .or_default()
            .push(region);
    }

    /// Check if a diagnostic at the given position for the given rule is suppressed.
    pub fn is_suppressed(&self, rule_name: &str, pos: TextSize) -> bool {
        [rule_name, ALL_RULES].iter().any(|key| {
            self.regions
                .get(*key)
                .is_some_and(|regions| regions.iter().any(|region| region.contains(pos)))
        })
    }

    /// Check if there are any suppressions.
    pub fn has_suppressions(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Parse @SuppressWarnings annotations from a CST tree.
    /// Looks for annotations like:
    /// - `@SuppressWarnings("ternlint:IfToTernary")`
    /// - `@SuppressWarnings({"ternlint:IfToTernary", "unchecked"})`
    pub fn parse_suppress_warnings(&mut self, root: &CstNode) {
        self.visit_for_annotations(root);
    }

    fn visit_for_annotations(&mut self, node: &CstNode) {
        if matches!(
            node.kind(),
            "class_declaration"
                | "interface_declaration"
                | "enum_declaration"
                | "method_declaration"
                | "constructor_declaration"
                | "field_declaration"
                | "record_declaration"
                | "local_variable_declaration"
        ) {
            let modifiers = node.children().find(|c| c.kind() == "modifiers");
            for child in modifiers.iter().flat_map(CstNode::children) {
                if is_annotation(&child) {
                    self.process_annotation(&child, node);
                }
            }
        }

        for child in node.named_children() {
            self.visit_for_annotations(&child);
        }
    }

    fn process_annotation(&mut self, annotation: &CstNode, target: &CstNode) {
        let name = annotation
            .child_by_field_name("name")
            .map_or("", |n| n.text());

        if name != "SuppressWarnings" && name != "java.lang.SuppressWarnings" {
            return;
        }

        let Some(args) = annotation.child_by_field_name("arguments") else {
            return;
        };

        let mut rules = Vec::new();
        extract_rules(&args, &mut rules);
        for rule in rules {
            self.add_region(SuppressionRegion {
                rule,
                start: target.range().start(),
                end: Some(target.range().end()),
            });
        }
    }
}

fn is_annotation(node: &CstNode) -> bool {
    matches!(node.kind(), "annotation" | "marker_annotation")
}

/// Collect rule names from string values anywhere under the arguments.
fn extract_rules(node: &CstNode, rules: &mut Vec<String>) {
    if node.kind() == "string_literal" {
        let content = node.text().trim_matches('"');
        if let Some(rule) = content.strip_prefix(ANNOTATION_PREFIX) {
            rules.push(rule.to_string());
        }
        return;
    }
    for child in node.named_children() {
        extract_rules(&child, rules);
    }
}

fn offset(pos: usize) -> TextSize {
    TextSize::new(u32::try_from(pos).unwrap_or(u32::MAX))
}

fn memchr_newline(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| from + i)
}

/// Offset just past the `*/` closing a block comment whose body starts at `from`.
fn find_block_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .windows(2)
        .position(|window| window == b"*/")
        .map(|i| from + i + 2)
}

/// Offset just past the string literal starting at `start`, so that `//`
/// inside a string is not taken for a comment.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' | b'\n' => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}
