//! Parser for ternlint.toml configuration files.
//!
//! Example:
//!
//! ```toml
//! [fix]
//! unsafe_fixes = false
//!
//! [fix.rules]
//! IfToTernary = "check"
//!
//! [rules.IfToTernary]
//! allowVirtualElse = true
//! maxSites = 2
//! ```

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// How a rule should handle violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleMode {
    /// Auto-fix violations (default for fixable rules).
    #[default]
    Fix,
    /// Only check/report violations, don't fix.
    Check,
    /// Show fix suggestion, require confirmation.
    Suggest,
    /// Skip the rule entirely.
    Disabled,
}

impl<'de> Deserialize<'de> for RuleMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "fix" => Ok(RuleMode::Fix),
            "check" => Ok(RuleMode::Check),
            "suggest" => Ok(RuleMode::Suggest),
            "disabled" | "disable" | "off" => Ok(RuleMode::Disabled),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid rule mode: {s}. Expected fix, check, suggest, or disabled"
            ))),
        }
    }
}

/// Fix-related configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FixConfig {
    /// Whether to apply unsafe fixes without --unsafe flag.
    #[serde(default)]
    pub unsafe_fixes: bool,

    /// Per-rule fix mode overrides.
    #[serde(default)]
    pub rules: HashMap<String, RuleMode>,
}

/// Root ternlint.toml configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TernlintConfig {
    /// Fix behavior configuration.
    #[serde(default)]
    pub fix: FixConfig,

    /// Per-rule properties, keyed by rule name.
    #[serde(default)]
    pub rules: BTreeMap<String, toml::Table>,
}

impl TernlintConfig {
    /// Parse a ternlint.toml file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse ternlint.toml content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Get the fix mode for a specific rule.
    /// Returns the configured mode or the default (Fix).
    pub fn rule_mode(&self, rule_name: &str) -> RuleMode {
        self.fix
            .rules
            .get(rule_name)
            .copied()
            .unwrap_or(RuleMode::Fix)
    }

    /// Check if a rule is enabled.
    pub fn is_rule_enabled(&self, rule_name: &str) -> bool {
        self.rule_mode(rule_name) != RuleMode::Disabled
    }

    /// Check if a rule should be auto-fixed.
    pub fn should_fix(&self, rule_name: &str) -> bool {
        self.rule_mode(rule_name) == RuleMode::Fix
    }

    /// Properties of a rule as strings, the form rules are configured from.
    pub fn rule_properties(&self, rule_name: &str) -> HashMap<String, String> {
        self.rules
            .get(rule_name)
            .map(|table| {
                table
                    .iter()
                    .map(|(key, value)| (key.clone(), property_string(value)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every rule name mentioned anywhere in the file.
    pub fn mentioned_rules(&self) -> impl Iterator<Item = &str> {
        self.rules
            .keys()
            .map(String::as_str)
            .chain(self.fix.rules.keys().map(String::as_str))
    }
}

fn property_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
