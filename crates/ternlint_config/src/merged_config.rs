//! Effective configuration: the built-in rule set overlaid with ternlint.toml.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{ConfigError, RuleMode, TernlintConfig};

/// File names searched for when no config path is given.
const CONFIG_CANDIDATES: &[&str] = &["ternlint.toml", ".ternlint.toml", "config/ternlint.toml"];

/// A configured rule with its properties and mode.
#[derive(Debug, Clone)]
pub struct ConfiguredRule {
    /// The rule name.
    pub name: String,
    /// Properties from the `[rules.<name>]` table.
    pub properties: HashMap<String, String>,
    /// How to handle violations.
    pub mode: RuleMode,
}

impl ConfiguredRule {
    /// Get a property value by name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Get properties as a reference map (for FromConfig).
    pub fn properties_ref(&self) -> HashMap<&str, &str> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Check if this rule is enabled.
    pub fn is_enabled(&self) -> bool {
        self.mode != RuleMode::Disabled
    }

    /// Check if this rule should auto-fix.
    pub fn should_fix(&self) -> bool {
        self.mode == RuleMode::Fix
    }
}

/// Merged configuration combining the built-in rules and ternlint.toml.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    /// All configured rules.
    pub rules: Vec<ConfiguredRule>,
    /// Whether to apply unsafe fixes.
    pub unsafe_fixes: bool,
    /// The file the overlay was read from, if any.
    pub source: Option<PathBuf>,
}

impl MergedConfig {
    /// Create a merged config for the given built-in rule names.
    ///
    /// Rules named only in the file are kept too, so callers can warn
    /// about them.
    pub fn new(builtin: &[&str], config: Option<&TernlintConfig>) -> Self {
        let config = config.cloned().unwrap_or_default();

        let mut names: Vec<String> = builtin.iter().map(|name| (*name).to_string()).collect();
        for name in config.mentioned_rules() {
            if !names.iter().any(|known| known == name) {
                names.push(name.to_string());
            }
        }

        let rules = names
            .into_iter()
            .map(|name| ConfiguredRule {
                properties: config.rule_properties(&name),
                mode: config.rule_mode(&name),
                name,
            })
            .collect();

        Self {
            rules,
            unsafe_fixes: config.fix.unsafe_fixes,
            source: None,
        }
    }

    /// Get enabled rules (not disabled).
    pub fn enabled_rules(&self) -> impl Iterator<Item = &ConfiguredRule> {
        self.rules.iter().filter(|r| r.is_enabled())
    }

    /// Get a specific rule by name.
    pub fn get_rule(&self, name: &str) -> Option<&ConfiguredRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Check if a rule is enabled.
    pub fn is_rule_enabled(&self, name: &str) -> bool {
        self.get_rule(name).is_some_and(ConfiguredRule::is_enabled)
    }
}

/// Builder for loading configuration from files.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    path: Option<PathBuf>,
    explicit: bool,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given ternlint.toml path. A missing file is an error.
    #[must_use]
    pub fn config(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self.explicit = true;
        self
    }

    /// Look for ternlint.toml in the usual locations under `root`,
    /// unless a path was given explicitly.
    #[must_use]
    pub fn find_in(mut self, root: impl AsRef<Path>) -> Self {
        if self.path.is_none() {
            self.path = CONFIG_CANDIDATES
                .iter()
                .map(|candidate| root.as_ref().join(candidate))
                .find(|candidate| candidate.exists());
        }
        self
    }

    /// Load and merge the configuration.
    pub fn load(self, builtin: &[&str]) -> Result<MergedConfig, ConfigError> {
        let Some(path) = self.path else {
            return Ok(MergedConfig::new(builtin, None));
        };

        if !path.exists() {
            if self.explicit {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Ok(MergedConfig::new(builtin, None));
        }

        let config = TernlintConfig::from_file(&path)?;
        tracing::info!(path = %path.display(), "loaded configuration");

        let mut merged = MergedConfig::new(builtin, Some(&config));
        merged.source = Some(path);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUILTIN: &[&str] = &["IfToTernary"];

    #[test]
    fn test_merged_config_without_file() {
        let merged = MergedConfig::new(BUILTIN, None);

        assert_eq!(merged.rules.len(), 1);
        assert!(!merged.unsafe_fixes);
        let rule = merged.get_rule("IfToTernary").unwrap();
        assert_eq!(rule.mode, RuleMode::Fix);
        assert!(rule.properties.is_empty());
        assert!(merged.is_rule_enabled("IfToTernary"));
    }

    #[test]
    fn test_merged_config_with_file() {
        let config = TernlintConfig::parse(
            r#"
[fix]
unsafe_fixes = true

[fix.rules]
IfToTernary = "check"
Legacy = "disabled"

[rules.IfToTernary]
maxSites = 2
"#,
        )
        .unwrap();

        let merged = MergedConfig::new(BUILTIN, Some(&config));

        assert!(merged.unsafe_fixes);
        assert_eq!(merged.rules.len(), 2);

        let rule = merged.get_rule("IfToTernary").unwrap();
        assert_eq!(rule.mode, RuleMode::Check);
        assert!(!rule.should_fix());
        assert_eq!(rule.property("maxSites"), Some("2"));
        assert_eq!(rule.properties_ref().get("maxSites"), Some(&"2"));

        assert!(!merged.is_rule_enabled("Legacy"));
        assert_eq!(merged.enabled_rules().count(), 1);
    }

    #[test]
    fn test_loader_finds_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ternlint.toml"),
            "[fix.rules]\nIfToTernary = \"disabled\"\n",
        )
        .unwrap();

        let merged = ConfigLoader::new().find_in(dir.path()).load(BUILTIN).unwrap();
        assert!(!merged.is_rule_enabled("IfToTernary"));
        assert_eq!(merged.source, Some(dir.path().join("ternlint.toml")));
    }

    #[test]
    fn test_loader_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let merged = ConfigLoader::new().find_in(dir.path()).load(BUILTIN).unwrap();
        assert!(merged.is_rule_enabled("IfToTernary"));
        assert!(merged.source.is_none());
    }

    #[test]
    fn test_loader_explicit_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::new()
            .config(dir.path().join("nope.toml"))
            .load(BUILTIN);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
