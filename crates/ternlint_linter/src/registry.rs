//! Rule registry mapping configuration names to rule implementations.

use std::collections::HashMap;

use ternlint_config::{ConfiguredRule, MergedConfig};

use crate::Rule;

/// Properties from a rule's configuration table.
pub type Properties<'a> = HashMap<&'a str, &'a str>;

/// Trait for rules that can be constructed from config properties.
pub trait FromConfig: Rule + Sized {
    /// The name this rule is configured under.
    const MODULE_NAME: &'static str;

    /// Create a rule instance from config properties.
    fn from_config(properties: &Properties) -> Self;
}

/// A factory function that creates a boxed rule from properties.
type RuleFactory = fn(&Properties) -> Box<dyn Rule>;

/// Registry mapping rule names to rule factories.
pub struct RuleRegistry {
    factories: HashMap<&'static str, RuleFactory>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with all built-in rules registered.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        registry
    }

    /// Register a rule type that implements FromConfig.
    pub fn register<R: FromConfig + 'static>(&mut self) {
        self.factories
            .insert(R::MODULE_NAME, |props| Box::new(R::from_config(props)));
    }

    fn register_builtins(&mut self) {
        use crate::rules::IfToTernary;

        self.register::<IfToTernary>();
    }

    /// Create a rule from a name and properties.
    /// Returns None if the name is not recognized.
    pub fn create_rule(&self, module_name: &str, properties: &Properties) -> Option<Box<dyn Rule>> {
        self.factories
            .get(module_name)
            .map(|factory| factory(properties))
    }

    /// Create every enabled rule of a merged configuration.
    ///
    /// Unknown names are logged and skipped.
    pub fn rules_from_config(&self, config: &MergedConfig) -> Vec<Box<dyn Rule>> {
        config
            .enabled_rules()
            .filter_map(|configured| self.create_configured(configured))
            .collect()
    }

    fn create_configured(&self, configured: &ConfiguredRule) -> Option<Box<dyn Rule>> {
        let rule = self.create_rule(&configured.name, &configured.properties_ref());
        if rule.is_none() {
            tracing::warn!(rule = %configured.name, "unknown rule, skipping");
        }
        rule
    }

    /// Check if a name is registered.
    pub fn has_rule(&self, module_name: &str) -> bool {
        self.factories.contains_key(module_name)
    }

    /// Get all registered names, sorted.
    pub fn module_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
