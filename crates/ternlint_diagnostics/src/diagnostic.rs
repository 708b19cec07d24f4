//! Diagnostic types for reporting violations.

use std::fmt;

use ternlint_text_size::{Ranged, TextRange};

use crate::Fix;

/// Indicates whether a fix is available for a violation.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq)]
pub enum FixAvailability {
    /// A fix is always available.
    Always,
    /// A fix is sometimes available.
    Sometimes,
    /// A fix is never available.
    #[default]
    None,
}

/// How prominently a diagnostic should be shown.
#[derive(Copy, Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord, is_macro::Is)]
pub enum Severity {
    /// A suggestion the user may ignore.
    Info,
    /// A finding the user should act on.
    #[default]
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A trait for violations that can be reported as diagnostics.
pub trait Violation: fmt::Debug + Clone + Send + Sync {
    /// The availability of a fix for this violation.
    const FIX_AVAILABILITY: FixAvailability = FixAvailability::None;

    /// Returns the message describing the violation.
    fn message(&self) -> String;

    /// Returns the title for the fix, if available.
    fn fix_title(&self) -> Option<String> {
        None
    }

    /// The severity the violation is reported with.
    fn severity(&self) -> Severity {
        Severity::Warning
    }

    /// Named values interpolated into the message, exposed for reporters
    /// that render their own text.
    fn parameters(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// The kind of diagnostic (rule code and message).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticKind {
    /// The rule code (e.g., "IfToTernaryViolation").
    pub code: String,
    /// The message body.
    pub body: String,
    /// The fix title, if the violation offers one.
    pub suggestion: Option<String>,
    /// The severity the diagnostic is reported with.
    pub severity: Severity,
    /// Message parameters.
    pub parameters: Vec<(&'static str, String)>,
}

impl DiagnosticKind {
    /// Look up a message parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A diagnostic representing a violation found in source code.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The kind of diagnostic.
    pub kind: DiagnosticKind,
    /// The range in the source where the violation occurs.
    pub range: TextRange,
    /// The optional fix for the violation.
    pub fix: Option<Fix>,
}

impl Diagnostic {
    /// Create a new diagnostic from a violation.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new<V: Violation>(violation: V, range: TextRange) -> Self {
        Self {
            kind: DiagnosticKind {
                code: std::any::type_name::<V>()
                    .split("::")
                    .last()
                    .unwrap_or("Unknown")
                    .to_string(),
                body: violation.message(),
                suggestion: violation.fix_title(),
                severity: violation.severity(),
                parameters: violation.parameters(),
            },
            range,
            fix: None,
        }
    }

    /// Add a fix to this diagnostic.
    #[must_use]
    pub fn with_fix(mut self, fix: Fix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Set the fix for this diagnostic.
    pub fn set_fix(&mut self, fix: Fix) {
        self.fix = Some(fix);
    }

    /// Returns true if this diagnostic has a fix.
    pub fn fixable(&self) -> bool {
        self.fix.is_some()
    }
}

impl Ranged for Diagnostic {
    fn range(&self) -> TextRange {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use ternlint_text_size::TextSize;

    use super::*;
    use crate::Edit;

    #[derive(Debug, Clone)]
    struct SampleViolation {
        count: usize,
    }

    impl Violation for SampleViolation {
        const FIX_AVAILABILITY: FixAvailability = FixAvailability::Always;

        fn message(&self) -> String {
            format!("{} things", self.count)
        }

        fn severity(&self) -> Severity {
            Severity::Info
        }

        fn parameters(&self) -> Vec<(&'static str, String)> {
            vec![("count", self.count.to_string())]
        }
    }

    #[test]
    fn test_diagnostic_kind_from_violation() {
        let range = TextRange::new(TextSize::new(1), TextSize::new(3));
        let diagnostic = Diagnostic::new(SampleViolation { count: 2 }, range);

        assert_eq!(diagnostic.kind.code, "SampleViolation");
        assert_eq!(diagnostic.kind.body, "2 things");
        assert!(diagnostic.kind.severity.is_info());
        assert_eq!(diagnostic.kind.parameter("count"), Some("2"));
        assert_eq!(diagnostic.kind.parameter("missing"), None);
        assert!(!diagnostic.fixable());
    }

    #[test]
    fn test_with_fix() {
        let range = TextRange::new(TextSize::new(0), TextSize::new(1));
        let diagnostic = Diagnostic::new(SampleViolation { count: 1 }, range)
            .with_fix(Fix::safe_edit(Edit::range_replacement("x".to_string(), range)));

        assert!(diagnostic.fixable());
    }
}
