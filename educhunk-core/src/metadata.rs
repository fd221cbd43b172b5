//! Pattern-derived chunk metadata
//!
//! Everything here comes from the chunk text and its detected elements. It
//! is what a chunk carries when no enrichment service is available.

use crate::error::Result;
use crate::text::{count_syllables, normalize_whitespace, sentences, words};
use crate::types::{Category, Chunk};
use crate::vocabulary::Vocabulary;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:is|are) (?:called|known as|defined as|termed) (?:an? |the )?([\p{L}][\p{L}\- ]{2,40}?)[.,;:]")
        .expect("definition pattern is valid")
});

/// Default extraction settings
pub mod defaults {
    /// Most key concepts kept per chunk
    pub const MAX_CONCEPTS: usize = 8;

    /// Shortest accepted concept in characters
    pub const MIN_CONCEPT_CHARS: usize = 3;

    /// Reading speed used for time estimates
    pub const READING_WPM: usize = 150;

    /// Minutes added per activity
    pub const MINUTES_PER_ACTIVITY: usize = 10;

    /// Minutes added per worked example
    pub const MINUTES_PER_EXAMPLE: usize = 5;

    /// Minutes added per question
    pub const MINUTES_PER_QUESTION: usize = 2;

    /// Most objectives or misconceptions kept per chunk
    pub const MAX_STATEMENTS: usize = 5;

    /// Extra weight of a term introduced by a definition phrase
    pub const DEFINITION_BOOST: usize = 3;
}

/// Estimated difficulty of a chunk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Observation and naming
    #[default]
    Beginner,
    /// Explanation and calculation
    Intermediate,
    /// Derivation and analysis
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        f.write_str(name)
    }
}

/// Metadata derived from patterns and word lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternMetadata {
    /// Most frequent valid concept terms
    #[serde(default)]
    pub key_concepts: Vec<String>,
    /// Estimated difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Estimated study time in minutes
    #[serde(default)]
    pub estimated_minutes: usize,
    /// Learning objectives stated in the text
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Misconceptions the text corrects
    #[serde(default)]
    pub misconceptions: Vec<String>,
    /// Number of words
    #[serde(default)]
    pub word_count: usize,
    /// Flesch reading ease, if the text has words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_ease: Option<f64>,
}

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataConfig {
    /// Most key concepts kept per chunk
    pub max_concepts: usize,
    /// Shortest accepted concept in characters
    pub min_concept_chars: usize,
    /// Reading speed used for time estimates
    pub reading_wpm: usize,
    /// Minutes added per activity
    pub minutes_per_activity: usize,
    /// Minutes added per worked example
    pub minutes_per_example: usize,
    /// Minutes added per question
    pub minutes_per_question: usize,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            max_concepts: defaults::MAX_CONCEPTS,
            min_concept_chars: defaults::MIN_CONCEPT_CHARS,
            reading_wpm: defaults::READING_WPM,
            minutes_per_activity: defaults::MINUTES_PER_ACTIVITY,
            minutes_per_example: defaults::MINUTES_PER_EXAMPLE,
            minutes_per_question: defaults::MINUTES_PER_QUESTION,
        }
    }
}

/// Derives [`PatternMetadata`] from a chunk
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    vocabulary: &'static Vocabulary,
    config: MetadataConfig,
}

impl MetadataExtractor {
    /// Create an extractor with the embedded vocabulary
    pub fn new() -> Result<Self> {
        Self::with_config(MetadataConfig::default())
    }

    /// Create an extractor with custom settings
    pub fn with_config(config: MetadataConfig) -> Result<Self> {
        if config.reading_wpm == 0 {
            return Err(crate::error::CoreError::Configuration(
                "reading_wpm must be greater than 0".into(),
            ));
        }
        Ok(Self {
            vocabulary: Vocabulary::english()?,
            config,
        })
    }

    /// Extract metadata from a chunk
    pub fn extract(&self, chunk: &Chunk) -> PatternMetadata {
        let text = chunk.text.as_str();
        let word_count = words(text).count();
        if word_count == 0 {
            return PatternMetadata::default();
        }

        let reading_ease = flesch_reading_ease(text);

        PatternMetadata {
            key_concepts: self.key_concepts(text),
            difficulty: self.difficulty(text, reading_ease),
            estimated_minutes: self.estimated_minutes(chunk, word_count),
            objectives: self.objectives(chunk),
            misconceptions: self.statements_with(text, &self.vocabulary.misconception_markers),
            word_count,
            reading_ease,
        }
    }

    fn key_concepts(&self, text: &str) -> Vec<String> {
        // term -> (weight, first position, display form)
        let mut scores: HashMap<String, (usize, usize, String)> = HashMap::new();

        let valid = candidate_terms(text, self.vocabulary)
            .into_iter()
            .filter(|t| self.vocabulary.is_valid_concept(t, self.config.min_concept_chars));
        for (position, term) in valid.enumerate() {
            let entry = scores
                .entry(term.to_lowercase())
                .or_insert((0, position, term.clone()));
            entry.0 += 1;
        }

        for caps in DEFINITION.captures_iter(text) {
            let Some(term) = caps.get(1) else { continue };
            let term = normalize_whitespace(term.as_str());
            if !self
                .vocabulary
                .is_valid_concept(&term, self.config.min_concept_chars)
            {
                continue;
            }
            let entry = scores
                .entry(term.to_lowercase())
                .or_insert((0, usize::MAX, term.clone()));
            entry.0 += defaults::DEFINITION_BOOST;
        }

        let mut ranked: Vec<(usize, usize, String)> = scores.into_values().collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .take(self.config.max_concepts)
            .map(|(_, _, term)| term)
            .collect()
    }

    fn difficulty(&self, text: &str, reading_ease: Option<f64>) -> Difficulty {
        let mut beginner = 0;
        let mut intermediate = 0;
        let mut advanced = 0;
        for word in words(text) {
            let lower = word.to_lowercase();
            if self.vocabulary.beginner.contains(&lower) {
                beginner += 1;
            } else if self.vocabulary.intermediate.contains(&lower) {
                intermediate += 1;
            } else if self.vocabulary.advanced.contains(&lower) {
                advanced += 1;
            }
        }

        if beginner + intermediate + advanced == 0 {
            return match reading_ease {
                Some(ease) if ease >= 70.0 => Difficulty::Beginner,
                Some(ease) if ease >= 50.0 => Difficulty::Intermediate,
                Some(_) => Difficulty::Advanced,
                None => Difficulty::Beginner,
            };
        }

        if advanced > intermediate && advanced > beginner {
            Difficulty::Advanced
        } else if intermediate > beginner {
            Difficulty::Intermediate
        } else {
            Difficulty::Beginner
        }
    }

    fn estimated_minutes(&self, chunk: &Chunk, word_count: usize) -> usize {
        let reading = word_count.div_ceil(self.config.reading_wpm);
        let practice = chunk.count(Category::Activity) * self.config.minutes_per_activity
            + chunk.count(Category::Example) * self.config.minutes_per_example
            + chunk.count(Category::Question) * self.config.minutes_per_question;
        (reading + practice).max(1)
    }

    fn objectives(&self, chunk: &Chunk) -> Vec<String> {
        let mut objectives: Vec<String> = chunk
            .elements
            .iter()
            .filter(|e| e.category == Category::PedagogicalMarker)
            .filter_map(|e| e.text.split_once(':').map(|(_, rest)| rest.trim().to_string()))
            .filter(|s| !s.is_empty())
            .collect();

        for statement in self.statements_with(&chunk.text, &self.vocabulary.objective_markers) {
            if !objectives.contains(&statement) {
                objectives.push(statement);
            }
        }
        objectives.truncate(defaults::MAX_STATEMENTS);
        objectives
    }

    fn statements_with(&self, text: &str, markers: &[String]) -> Vec<String> {
        sentences(text)
            .into_iter()
            .filter(|s| {
                let lower = s.to_lowercase();
                markers.iter().any(|m| lower.contains(m.as_str()))
            })
            .map(normalize_whitespace)
            .take(defaults::MAX_STATEMENTS)
            .collect()
    }
}

/// Candidate concept terms in order of appearance
///
/// Phrases of up to three words between stop words, numbers and
/// punctuation.
pub(crate) fn candidate_terms(text: &str, vocabulary: &Vocabulary) -> Vec<String> {
    const MAX_PHRASE_WORDS: usize = 3;
    let mut terms = Vec::new();

    for sentence in sentences(text) {
        for clause in sentence.split([',', ';', ':', '(', ')', '[', ']', '"', '“', '”']) {
            let mut run: Vec<&str> = Vec::new();
            for word in words(clause) {
                let is_break = vocabulary.is_stop_word(&word.to_lowercase())
                    || word.chars().all(|c| c.is_ascii_digit());
                if is_break {
                    flush_run(&mut run, &mut terms, MAX_PHRASE_WORDS);
                } else {
                    run.push(word);
                }
            }
            flush_run(&mut run, &mut terms, MAX_PHRASE_WORDS);
        }
    }
    terms
}

fn flush_run(run: &mut Vec<&str>, terms: &mut Vec<String>, max_words: usize) {
    for group in run.chunks(max_words) {
        terms.push(group.join(" "));
    }
    run.clear();
}

/// Flesch reading ease of the text, `None` when it has no words
pub(crate) fn flesch_reading_ease(text: &str) -> Option<f64> {
    let sentence_count = sentences(text).len().max(1) as f64;
    let word_list: Vec<&str> = words(text).collect();
    if word_list.is_empty() {
        return None;
    }
    let word_count = word_list.len() as f64;
    let syllables: usize = word_list.iter().map(|w| count_syllables(w)).sum();

    Some(206.835 - 1.015 * (word_count / sentence_count) - 84.6 * (syllables as f64 / word_count))
}
