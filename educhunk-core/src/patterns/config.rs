use serde::{Deserialize, Serialize};

/// On-disk shape of a pattern table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTableConfig {
    pub metadata: TableMetadata,
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub id: String,
    pub category: String,
    pub pattern: String,
    /// Group whose span becomes the element span (whole match when absent)
    #[serde(default)]
    pub capture_group: Option<usize>,
    /// Group whose text becomes the element label
    #[serde(default)]
    pub label_group: Option<usize>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

fn default_confidence() -> f64 {
    0.8
}

fn default_language() -> String {
    "any".to_string()
}
