//! Chunk quality scoring
//!
//! Every dimension is a heuristic in [0,1]. Thresholds live in
//! [`ScoringConfig`] so callers can tune them per corpus.

use crate::error::{CoreError, Result};
use crate::metadata::{candidate_terms, flesch_reading_ease};
use crate::text::{ends_with_terminal, sentences, words};
use crate::types::{Category, Chunk, Dimension, QualityScores};
use crate::vocabulary::Vocabulary;
use std::collections::{BTreeMap, HashMap};

/// Default scoring thresholds
pub mod defaults {
    /// Completeness penalty when the text stops mid-sentence
    pub const TRUNCATION_PENALTY: f64 = 0.3;

    /// Coherence penalty per line repeated too often
    pub const REPEATED_LINE_PENALTY: f64 = 0.1;

    /// Occurrences of one line tolerated before it counts as repetition
    pub const REPEATED_LINE_LIMIT: usize = 2;

    /// Coherence penalty when the text opens mid-sentence
    pub const BROKEN_START_PENALTY: f64 = 0.2;

    /// Coherence penalty when an example precedes the first activity
    pub const ORDER_PENALTY: f64 = 0.1;

    /// Share of valid concept terms that earns a full concept score
    pub const GOOD_CONCEPT_FRACTION: f64 = 0.6;

    /// Applications (activities, examples, questions) for a full score
    pub const APPLICATION_TARGET: usize = 2;

    /// Shortest accepted concept in characters
    pub const MIN_CONCEPT_CHARS: usize = 3;

    /// Words needed for an introduction or conclusion to count
    pub const MIN_FRAME_WORDS: usize = 3;

    /// Structural weight of an introduction
    pub const INTRO_WEIGHT: f64 = 0.2;

    /// Structural weight of an activity
    pub const ACTIVITY_WEIGHT: f64 = 0.3;

    /// Structural weight of a worked example
    pub const EXAMPLE_WEIGHT: f64 = 0.3;

    /// Structural weight of a conclusion
    pub const CONCLUSION_WEIGHT: f64 = 0.1;

    /// Structural weight of at least one valid concept
    pub const CONCEPT_WEIGHT: f64 = 0.1;
}

/// Scoring thresholds and aggregate weights
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Completeness lost when the text stops mid-sentence, in [0,1]
    pub truncation_penalty: f64,
    /// Coherence lost per line repeated more than `repeated_line_limit` times
    pub repeated_line_penalty: f64,
    /// Occurrences of one line tolerated before it counts as repetition
    pub repeated_line_limit: usize,
    /// Coherence lost when the text opens mid-sentence
    pub broken_start_penalty: f64,
    /// Coherence lost when an example precedes the first activity
    pub order_penalty: f64,
    /// Share of valid concept terms that earns a full concept score
    pub good_concept_fraction: f64,
    /// Activities, examples and questions needed for a full application score
    pub application_target: usize,
    /// Shortest accepted concept in characters
    pub min_concept_chars: usize,
    /// Words needed for an introduction or conclusion to count
    pub min_frame_words: usize,
    /// Weights for the aggregate; empty means a plain mean
    pub weights: BTreeMap<Dimension, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            truncation_penalty: defaults::TRUNCATION_PENALTY,
            repeated_line_penalty: defaults::REPEATED_LINE_PENALTY,
            repeated_line_limit: defaults::REPEATED_LINE_LIMIT,
            broken_start_penalty: defaults::BROKEN_START_PENALTY,
            order_penalty: defaults::ORDER_PENALTY,
            good_concept_fraction: defaults::GOOD_CONCEPT_FRACTION,
            application_target: defaults::APPLICATION_TARGET,
            min_concept_chars: defaults::MIN_CONCEPT_CHARS,
            min_frame_words: defaults::MIN_FRAME_WORDS,
            weights: BTreeMap::new(),
        }
    }
}

impl ScoringConfig {
    /// Check thresholds and weights
    pub fn validate(&self) -> Result<()> {
        let penalties = [
            ("truncation_penalty", self.truncation_penalty),
            ("repeated_line_penalty", self.repeated_line_penalty),
            ("broken_start_penalty", self.broken_start_penalty),
            ("order_penalty", self.order_penalty),
        ];
        for (name, value) in penalties {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Configuration(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }

        if !(self.good_concept_fraction > 0.0 && self.good_concept_fraction <= 1.0) {
            return Err(CoreError::Configuration(format!(
                "good_concept_fraction must be in (0, 1], got {}",
                self.good_concept_fraction
            )));
        }

        if self.application_target == 0 {
            return Err(CoreError::Configuration(
                "application_target must be greater than 0".into(),
            ));
        }

        if self.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(CoreError::Configuration(
                "dimension weights must be finite and non-negative".into(),
            ));
        }
        if !self.weights.is_empty() && self.weights.values().sum::<f64>() <= 0.0 {
            return Err(CoreError::Configuration(
                "dimension weights must not all be zero".into(),
            ));
        }

        Ok(())
    }
}

/// Computes per-dimension quality scores for chunks
#[derive(Debug, Clone)]
pub struct MetadataScorer {
    config: ScoringConfig,
    vocabulary: &'static Vocabulary,
}

impl MetadataScorer {
    /// Create a scorer with default thresholds
    pub fn new() -> Result<Self> {
        Self::with_config(ScoringConfig::default())
    }

    /// Create a scorer with custom thresholds
    pub fn with_config(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            vocabulary: Vocabulary::english()?,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a chunk
    ///
    /// Empty or whitespace-only text scores 0.0 on every dimension.
    pub fn score(&self, chunk: &Chunk) -> QualityScores {
        if chunk.text.trim().is_empty() {
            return QualityScores {
                dimensions: Dimension::ALL.iter().map(|d| (*d, 0.0)).collect(),
                aggregate: 0.0,
            };
        }

        let dimensions: BTreeMap<Dimension, f64> = Dimension::ALL
            .iter()
            .map(|d| (*d, self.dimension(*d, chunk).clamp(0.0, 1.0)))
            .collect();
        let aggregate = self.aggregate(&dimensions);

        QualityScores {
            dimensions,
            aggregate,
        }
    }

    /// Score a chunk and attach the result
    pub fn apply(&self, chunk: Chunk) -> Chunk {
        let scores = self.score(&chunk);
        chunk.with_quality(scores)
    }

    fn dimension(&self, dimension: Dimension, chunk: &Chunk) -> f64 {
        match dimension {
            Dimension::Completeness => self.completeness(chunk),
            Dimension::Coherence => self.coherence(chunk),
            Dimension::ConceptQuality => self.concept_quality(&chunk.text),
            Dimension::ApplicationQuality => self.application_quality(chunk),
            Dimension::StructuralCompleteness => self.structural_completeness(chunk),
            Dimension::Readability => flesch_reading_ease(&chunk.text)
                .map_or(0.0, |ease| ease / 100.0),
        }
    }

    fn aggregate(&self, dimensions: &BTreeMap<Dimension, f64>) -> f64 {
        if self.config.weights.is_empty() {
            let total: f64 = dimensions.values().sum();
            return (total / dimensions.len() as f64).clamp(0.0, 1.0);
        }

        let (weighted, weight_sum) = dimensions.iter().fold((0.0, 0.0), |(acc, sum), (d, s)| {
            let w = self.config.weights.get(d).copied().unwrap_or(0.0);
            (acc + s * w, sum + w)
        });
        if weight_sum <= 0.0 {
            return 0.0;
        }
        (weighted / weight_sum).clamp(0.0, 1.0)
    }

    fn completeness(&self, chunk: &Chunk) -> f64 {
        let heading = chunk.heading.as_deref().map(str::trim);
        let mut segments = sentences(&chunk.text);
        if segments.first().copied() == heading {
            segments.remove(0);
        }
        if segments.is_empty() {
            return 0.0;
        }

        let terminated = segments.iter().filter(|s| ends_with_terminal(s)).count();
        let mut score = terminated as f64 / segments.len() as f64;
        if !ends_with_terminal(&chunk.text) {
            score -= self.config.truncation_penalty;
        }
        score
    }

    fn coherence(&self, chunk: &Chunk) -> f64 {
        let mut score = 1.0;

        let mut line_counts: HashMap<&str, usize> = HashMap::new();
        for line in chunk.text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            *line_counts.entry(line).or_default() += 1;
        }
        let repeated = line_counts
            .values()
            .filter(|n| **n > self.config.repeated_line_limit)
            .count();
        score -= repeated as f64 * self.config.repeated_line_penalty;

        if chunk
            .text
            .trim_start()
            .chars()
            .next()
            .is_some_and(char::is_lowercase)
        {
            score -= self.config.broken_start_penalty;
        }

        let first_of = |category: Category| {
            chunk
                .elements
                .iter()
                .filter(|e| e.category == category)
                .map(|e| e.start)
                .min()
        };
        if let (Some(example), Some(activity)) =
            (first_of(Category::Example), first_of(Category::Activity))
        {
            if example < activity {
                score -= self.config.order_penalty;
            }
        }

        score
    }

    fn concept_quality(&self, text: &str) -> f64 {
        let candidates = candidate_terms(text, self.vocabulary);
        if candidates.is_empty() {
            return 0.0;
        }
        let valid = candidates
            .iter()
            .filter(|t| {
                self.vocabulary
                    .is_valid_concept(t, self.config.min_concept_chars)
            })
            .count();
        let fraction = valid as f64 / candidates.len() as f64;
        fraction / self.config.good_concept_fraction
    }

    fn application_quality(&self, chunk: &Chunk) -> f64 {
        let applications = chunk.count(Category::Activity)
            + chunk.count(Category::Example)
            + chunk.count(Category::Question);
        applications as f64 / self.config.application_target as f64
    }

    fn structural_completeness(&self, chunk: &Chunk) -> f64 {
        let base = chunk.position_range.start;
        let first_start = chunk.elements.iter().map(|e| e.start).min();
        let last_end = chunk.elements.iter().map(|e| e.end).max();

        let intro = match first_start {
            Some(start) => chunk.text.get(..start.saturating_sub(base)).unwrap_or(""),
            None => chunk.text.as_str(),
        };
        let conclusion = match last_end {
            Some(end) => chunk.text.get(end.saturating_sub(base)..).unwrap_or(""),
            None => "",
        };

        let mut score = 0.0;
        if words(intro).count() >= self.config.min_frame_words {
            score += defaults::INTRO_WEIGHT;
        }
        if chunk.count(Category::Activity) > 0 {
            score += defaults::ACTIVITY_WEIGHT;
        }
        if chunk.count(Category::Example) > 0 {
            score += defaults::EXAMPLE_WEIGHT;
        }
        if words(conclusion).count() >= self.config.min_frame_words {
            score += defaults::CONCLUSION_WEIGHT;
        }
        let has_concept = candidate_terms(&chunk.text, self.vocabulary)
            .iter()
            .any(|t| self.vocabulary.is_valid_concept(t, self.config.min_concept_chars));
        if has_concept {
            score += defaults::CONCEPT_WEIGHT;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PatternMetadata;
    use crate::types::{DetectedElement, Span};

    fn element(category: Category, text: &str, needle: &str) -> DetectedElement {
        let start = text.find(needle).unwrap();
        DetectedElement {
            category,
            start,
            end: start + needle.len(),
            text: needle.to_string(),
            label: None,
            rule_id: format!("{}.test", category.as_str()),
            confidence: 0.9,
        }
    }

    fn chunk(text: &str, heading: Option<&str>, elements: Vec<DetectedElement>) -> Chunk {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|c| (*c, 0)).collect();
        for e in &elements {
            *counts.entry(e.category).or_default() += 1;
        }
        Chunk {
            id: "id".to_string(),
            source_document: "doc".to_string(),
            position_range: Span::new(0, text.len()),
            heading: heading.map(str::to_string),
            text: text.to_string(),
            category_counts: counts,
            elements,
            quality_scores: BTreeMap::new(),
            aggregate_quality: 0.0,
            metadata: PatternMetadata::default(),
            enrichment: None,
        }
    }

    fn scenario() -> Chunk {
        let text = "8.1 Force\nIntro text. Activity 8.1: push a box. More text.";
        let activity = element(Category::Activity, text, "Activity 8.1: push a box.");
        chunk(text, Some("8.1 Force"), vec![activity])
    }

    #[test]
    fn test_scenario_scores_are_bounded_and_positive() {
        let scores = MetadataScorer::new().unwrap().score(&scenario());
        assert_eq!(scores.dimensions.len(), Dimension::ALL.len());
        for value in scores.dimensions.values() {
            assert!((0.0..=1.0).contains(value));
        }
        assert!(scores.aggregate > 0.0);
        assert_eq!(scores.get(Dimension::Completeness), 1.0);
        assert_eq!(scores.get(Dimension::ApplicationQuality), 0.5);
    }

    #[test]
    fn test_empty_text_scores_zero() {
        let scorer = MetadataScorer::new().unwrap();
        for text in ["", "   \n\t "] {
            let scores = scorer.score(&chunk(text, None, Vec::new()));
            assert_eq!(scores.aggregate, 0.0);
            assert!(scores.dimensions.values().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_truncated_text_loses_completeness() {
        let scorer = MetadataScorer::new().unwrap();
        let whole = scorer.score(&chunk("Friction slows motion. It produces heat.", None, Vec::new()));
        let cut = scorer.score(&chunk("Friction slows motion. It produces", None, Vec::new()));
        assert!(cut.get(Dimension::Completeness) < whole.get(Dimension::Completeness));
    }

    #[test]
    fn test_coherence_penalties() {
        let scorer = MetadataScorer::new().unwrap();
        let clean = scorer.score(&chunk("Friction slows motion.", None, Vec::new()));
        assert_eq!(clean.get(Dimension::Coherence), 1.0);

        let broken = scorer.score(&chunk("slows motion down.", None, Vec::new()));
        assert!((broken.get(Dimension::Coherence) - 0.8).abs() < 1e-9);

        let repeated = "Page 12\nPage 12\nPage 12\nFriction slows motion.";
        let scores = scorer.score(&chunk(repeated, None, Vec::new()));
        assert!((scores.get(Dimension::Coherence) - 0.9).abs() < 1e-9);

        let text = "Example 1.1 A ball rolls. Activity 1.1 Roll a ball.";
        let elements = vec![
            element(Category::Example, text, "Example 1.1 A ball rolls."),
            element(Category::Activity, text, "Activity 1.1 Roll a ball."),
        ];
        let scores = scorer.score(&chunk(text, None, elements));
        assert!((scores.get(Dimension::Coherence) - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_structure_rewards_intro_practice_and_conclusion() {
        let text = "Forces change the motion of objects. Activity 2.1: Push a toy car. \
                    Example 2.1 A cart is pulled. So forces act in pairs around us.";
        let elements = vec![
            element(Category::Activity, text, "Activity 2.1: Push a toy car."),
            element(Category::Example, text, "Example 2.1 A cart is pulled."),
        ];
        let scores = MetadataScorer::new().unwrap().score(&chunk(text, None, elements));
        assert!((scores.get(Dimension::StructuralCompleteness) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_aggregate() {
        let mut weights = BTreeMap::new();
        weights.insert(Dimension::ApplicationQuality, 1.0);
        let config = ScoringConfig {
            weights,
            ..ScoringConfig::default()
        };
        let scores = MetadataScorer::with_config(config).unwrap().score(&scenario());
        assert_eq!(scores.aggregate, scores.get(Dimension::ApplicationQuality));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let bad = ScoringConfig {
            truncation_penalty: 1.5,
            ..ScoringConfig::default()
        };
        assert!(matches!(
            MetadataScorer::with_config(bad),
            Err(CoreError::Configuration(_))
        ));

        let mut weights = BTreeMap::new();
        weights.insert(Dimension::Readability, 0.0);
        let zero = ScoringConfig {
            weights,
            ..ScoringConfig::default()
        };
        assert!(zero.validate().is_err());

        let no_target = ScoringConfig {
            application_target: 0,
            ..ScoringConfig::default()
        };
        assert!(no_target.validate().is_err());
    }
}
