//! Compiled pattern library

use super::config::{PatternTableConfig, RuleConfig};
use crate::error::{CoreError, Result};
use crate::types::Category;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Language tag matching every language
pub const ANY_LANGUAGE: &str = "any";

/// A compiled detection rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique rule id, e.g. "activity.numbered"
    pub id: String,
    /// Category of the elements the rule produces
    pub category: Category,
    /// Compiled pattern
    pub regex: Regex,
    /// Group whose span becomes the element span
    pub capture_group: Option<usize>,
    /// Group whose text becomes the element label
    pub label_group: Option<usize>,
    /// Base confidence in [0,1]
    pub confidence: f64,
    /// Language tag ("en", "hi", or "any")
    pub language: String,
    /// Free-form description
    pub description: String,
    /// Sample texts the rule must match
    pub examples: Vec<String>,
}

impl Rule {
    fn compile(config: &RuleConfig) -> Result<Self> {
        let category: Category = config.category.parse().map_err(|_| {
            CoreError::Configuration(format!(
                "rule {}: unknown category '{}'",
                config.id, config.category
            ))
        })?;

        let regex = Regex::new(&config.pattern).map_err(|e| {
            CoreError::Configuration(format!("rule {}: invalid pattern: {e}", config.id))
        })?;

        let groups = regex.captures_len();
        for (name, group) in [
            ("capture_group", config.capture_group),
            ("label_group", config.label_group),
        ] {
            if let Some(index) = group {
                if index >= groups {
                    return Err(CoreError::Configuration(format!(
                        "rule {}: {name} {index} exceeds the {} groups of the pattern",
                        config.id,
                        groups - 1
                    )));
                }
            }
        }

        if !(0.0..=1.0).contains(&config.confidence) {
            return Err(CoreError::Configuration(format!(
                "rule {}: confidence {} outside [0, 1]",
                config.id, config.confidence
            )));
        }

        Ok(Self {
            id: config.id.clone(),
            category,
            regex,
            capture_group: config.capture_group,
            label_group: config.label_group,
            confidence: config.confidence,
            language: config.language.clone(),
            description: config.description.clone(),
            examples: config.examples.clone(),
        })
    }

    /// Whether the rule applies to `language`
    pub fn applies_to(&self, language: &str) -> bool {
        self.language == ANY_LANGUAGE || self.language.eq_ignore_ascii_case(language)
    }
}

/// A rule example that its own rule does not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleFailure {
    /// Rule id
    pub rule_id: String,
    /// The example text that failed
    pub example: String,
}

/// Ordered detection rules grouped by category
///
/// Immutable after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    name: String,
    description: String,
    rules: BTreeMap<Category, Vec<Rule>>,
}

impl PatternLibrary {
    /// Parse and compile a pattern table from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PatternTableConfig = toml::from_str(content)
            .map_err(|e| CoreError::Configuration(format!("failed to parse pattern table: {e}")))?;
        Self::from_config(&config)
    }

    /// Load a pattern table file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Compile a parsed table
    pub fn from_config(config: &PatternTableConfig) -> Result<Self> {
        let mut rules: BTreeMap<Category, Vec<Rule>> =
            Category::ALL.iter().map(|c| (*c, Vec::new())).collect();
        let mut seen = std::collections::HashSet::new();

        for rule_config in &config.rules {
            if !seen.insert(rule_config.id.as_str()) {
                return Err(CoreError::Configuration(format!(
                    "duplicate rule id: {}",
                    rule_config.id
                )));
            }
            let rule = Rule::compile(rule_config)?;
            rules.entry(rule.category).or_default().push(rule);
        }

        log::debug!(
            "compiled pattern table '{}' with {} rules",
            config.metadata.name,
            config.rules.len()
        );

        Ok(Self {
            name: config.metadata.name.clone(),
            description: config.metadata.description.clone(),
            rules,
        })
    }

    /// Copy of the library keeping only rules for `language` (and "any")
    pub fn for_language(&self, language: &str) -> Self {
        let rules = self
            .rules
            .iter()
            .map(|(category, rules)| {
                let kept = rules
                    .iter()
                    .filter(|r| r.applies_to(language))
                    .cloned()
                    .collect();
                (*category, kept)
            })
            .collect();

        Self {
            name: format!("{}:{}", self.name, language),
            description: self.description.clone(),
            rules,
        }
    }

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Ordered rules of a category
    pub fn rules_for(&self, category: Category) -> &[Rule] {
        self.rules.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ordered rules of a category given by name
    pub fn rules_for_name(&self, category: &str) -> Result<&[Rule]> {
        let category: Category = category.parse()?;
        Ok(self.rules_for(category))
    }

    /// All rules in category order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values().flatten()
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// Whether the library has no rules at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every rule against its own examples
    pub fn validate_examples(&self) -> Vec<ExampleFailure> {
        self.rules()
            .flat_map(|rule| {
                rule.examples
                    .iter()
                    .filter(|example| !rule.regex.is_match(example))
                    .map(|example| ExampleFailure {
                        rule_id: rule.id.clone(),
                        example: example.clone(),
                    })
            })
            .collect()
    }
}
