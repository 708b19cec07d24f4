//! Configuration loading for ternlint.
//!
//! `ternlint.toml` selects which rules run, passes string properties to
//! them and controls how their violations are fixed.

mod merged_config;
mod ternlint_config;

pub use merged_config::{ConfigLoader, ConfiguredRule, MergedConfig};
pub use ternlint_config::{ConfigError, FixConfig, RuleMode, TernlintConfig};
