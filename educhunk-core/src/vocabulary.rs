//! Embedded word lists for concept extraction and difficulty estimation

use crate::error::{CoreError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

static ENGLISH: OnceLock<std::result::Result<Vocabulary, CoreError>> = OnceLock::new();

#[derive(Debug, Deserialize)]
struct VocabularyConfig {
    metadata: VocabularyMetadata,
    terms: TermsConfig,
    difficulty: DifficultyConfig,
    phrases: PhrasesConfig,
}

#[derive(Debug, Deserialize)]
struct VocabularyMetadata {
    code: String,
}

#[derive(Debug, Deserialize)]
struct TermsConfig {
    stop_words: Vec<String>,
    #[serde(default)]
    generic_terms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DifficultyConfig {
    beginner: Vec<String>,
    intermediate: Vec<String>,
    advanced: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PhrasesConfig {
    #[serde(default)]
    objective_markers: Vec<String>,
    #[serde(default)]
    misconception_markers: Vec<String>,
}

/// Word lists of one language, all lower-case
#[derive(Debug, Clone)]
pub struct Vocabulary {
    code: String,
    stop_words: HashSet<String>,
    generic_terms: HashSet<String>,
    pub(crate) beginner: HashSet<String>,
    pub(crate) intermediate: HashSet<String>,
    pub(crate) advanced: HashSet<String>,
    pub(crate) objective_markers: Vec<String>,
    pub(crate) misconception_markers: Vec<String>,
}

fn lower_set(words: Vec<String>) -> HashSet<String> {
    words.into_iter().map(|w| w.to_lowercase()).collect()
}

impl Vocabulary {
    fn from_toml_str(content: &str) -> Result<Self> {
        let config: VocabularyConfig = toml::from_str(content)
            .map_err(|e| CoreError::Configuration(format!("failed to parse vocabulary: {e}")))?;

        if config.terms.stop_words.is_empty() {
            return Err(CoreError::Configuration(format!(
                "vocabulary {} has no stop words",
                config.metadata.code
            )));
        }

        Ok(Self {
            code: config.metadata.code,
            stop_words: lower_set(config.terms.stop_words),
            generic_terms: lower_set(config.terms.generic_terms),
            beginner: lower_set(config.difficulty.beginner),
            intermediate: lower_set(config.difficulty.intermediate),
            advanced: lower_set(config.difficulty.advanced),
            objective_markers: config.phrases.objective_markers,
            misconception_markers: config.phrases.misconception_markers,
        })
    }

    /// The embedded English vocabulary
    pub fn english() -> Result<&'static Vocabulary> {
        ENGLISH
            .get_or_init(|| {
                Vocabulary::from_toml_str(include_str!("../configs/vocabulary/en.toml"))
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Language code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Whether a lower-case word is a stop word
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Whether a candidate term passes the concept filter
    ///
    /// A concept has at least `min_chars` characters, is not made of stop
    /// words only, is not a generic term, and has at least one word longer
    /// than three characters.
    pub fn is_valid_concept(&self, term: &str, min_chars: usize) -> bool {
        let lower = term.trim().to_lowercase();
        if lower.chars().count() < min_chars {
            return false;
        }
        if self.generic_terms.contains(&lower) {
            return false;
        }
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.iter().all(|w| self.stop_words.contains(*w)) {
            return false;
        }
        words.iter().any(|w| w.chars().count() > 3)
    }
}
