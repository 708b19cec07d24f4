//! Diagnostic and fix infrastructure for linting.
//!
//! Modelled on [ruff_diagnostics](https://github.com/astral-sh/ruff)
//! by Astral Software Inc., licensed under MIT.

pub use diagnostic::{Diagnostic, DiagnosticKind, FixAvailability, Severity, Violation};
pub use edit::Edit;
pub use fix::{Applicability, Fix, IsolationLevel};

mod diagnostic;
mod edit;
mod fix;
