//! Element detection
//!
//! Runs every rule of the pattern library over the text, one category at a
//! time. Overlaps inside a category are removed here; overlaps between
//! categories are left for the boundary resolver.

use crate::error::{CoreError, Result};
use crate::patterns::{PatternLibrary, Rule};
use crate::text::{
    ceil_char_boundary, floor_char_boundary, last_sentence_end, normalize_whitespace,
};
use crate::types::{Category, DetectedElement};
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Default detector settings
pub mod defaults {
    /// Candidates below this confidence are dropped
    pub const MIN_CONFIDENCE: f64 = 0.5;

    /// Bytes inspected on each side of a match for context words
    pub const CONTEXT_WINDOW: usize = 50;

    /// Bonus when the context mentions a chapter, section or lesson
    pub const CONTEXT_BONUS: f64 = 0.1;

    /// Penalty when a match starts in the middle of a word
    pub const MID_WORD_PENALTY: f64 = 0.2;
}

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\d+\.\d+[ \t]+\p{Lu}").expect("section header pattern is valid")
});

static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("blank line pattern is valid"));

/// Maximum lengths for growing block elements past their header
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentPolicy {
    /// Longest activity element
    pub activity_max: usize,
    /// Longest example element
    pub example_max: usize,
    /// Longest special box element
    pub special_box_max: usize,
    /// Longest question element
    pub question_max: usize,
}

impl Default for ExtentPolicy {
    fn default() -> Self {
        Self {
            activity_max: 2000,
            example_max: 1500,
            special_box_max: 1000,
            question_max: 800,
        }
    }
}

impl ExtentPolicy {
    /// Maximum length of a grown element of `category`, `None` for
    /// categories that never grow
    pub fn max_len(&self, category: Category) -> Option<usize> {
        match category {
            Category::Activity => Some(self.activity_max),
            Category::Example => Some(self.example_max),
            Category::SpecialBox => Some(self.special_box_max),
            Category::Question => Some(self.question_max),
            _ => None,
        }
    }
}

/// Detector settings
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Candidates below this confidence are dropped
    pub min_confidence: f64,
    /// Grow block elements to the next structural boundary
    pub extents: Option<ExtentPolicy>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: defaults::MIN_CONFIDENCE,
            extents: None,
        }
    }
}

impl DetectorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(CoreError::Configuration(format!(
                "min_confidence {} outside [0, 1]",
                self.min_confidence
            )));
        }
        if let Some(extents) = &self.extents {
            for category in Category::ALL {
                if extents.max_len(category) == Some(0) {
                    return Err(CoreError::Configuration(format!(
                        "extent maximum for {category} must be greater than 0"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Locates educational elements in raw text
#[derive(Debug, Clone)]
pub struct ElementDetector {
    library: Arc<PatternLibrary>,
    config: DetectorConfig,
}

impl ElementDetector {
    /// Create a detector with default settings
    pub fn new(library: Arc<PatternLibrary>) -> Self {
        Self {
            library,
            config: DetectorConfig::default(),
        }
    }

    /// Create a detector with custom settings
    pub fn with_config(library: Arc<PatternLibrary>, config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { library, config })
    }

    /// The pattern library in use
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Detect elements of every category, sorted by start offset
    pub fn detect(&self, text: &str) -> Vec<DetectedElement> {
        self.detect_with_stops(text, &[])
    }

    /// Detect elements, never growing an extent across one of `stops`
    ///
    /// `stops` are byte offsets where a new unit begins, such as section
    /// marker offsets. They only matter when extent growth is enabled.
    pub fn detect_with_stops(&self, text: &str, stops: &[usize]) -> Vec<DetectedElement> {
        let mut elements: Vec<DetectedElement> = Category::ALL
            .iter()
            .flat_map(|category| dedupe_same_category(self.candidates(text, *category)))
            .collect();

        if let Some(extents) = &self.config.extents {
            grow_extents(text, &mut elements, extents, stops);
        }

        elements.sort_by_key(|e| (e.start, e.category, e.end));
        log::debug!("detected {} elements in {} bytes", elements.len(), text.len());
        elements
    }

    /// Detect elements of one category, sorted by start offset
    pub fn detect_category(&self, text: &str, category: Category) -> Vec<DetectedElement> {
        let mut elements = dedupe_same_category(self.candidates(text, category));
        if let Some(extents) = &self.config.extents {
            grow_extents(text, &mut elements, extents, &[]);
        }
        elements
    }

    /// All candidates of a category in rule order, before deduplication
    fn candidates(&self, text: &str, category: Category) -> Vec<DetectedElement> {
        let mut out = Vec::new();
        for rule in self.library.rules_for(category) {
            for caps in rule.regex.captures_iter(text) {
                let Some(span) = caps.get(rule.capture_group.unwrap_or(0)) else {
                    continue;
                };
                if span.is_empty() {
                    continue;
                }

                let confidence = adjusted_confidence(text, span.start(), span.end(), rule);
                if confidence < self.config.min_confidence {
                    log::trace!(
                        "dropping {} candidate at {} (confidence {confidence:.2})",
                        rule.id,
                        span.start()
                    );
                    continue;
                }

                let label = rule
                    .label_group
                    .and_then(|g| caps.get(g))
                    .map(|m| normalize_whitespace(m.as_str()))
                    .filter(|l| !l.is_empty());

                out.push(DetectedElement {
                    category,
                    start: span.start(),
                    end: span.end(),
                    text: span.as_str().to_string(),
                    label,
                    rule_id: rule.id.clone(),
                    confidence,
                });
            }
        }
        out
    }
}

/// Rule confidence adjusted for the surrounding text, clamped to [0,1]
fn adjusted_confidence(text: &str, start: usize, end: usize, rule: &Rule) -> f64 {
    let mut confidence = rule.confidence;

    let window_start = floor_char_boundary(text, start.saturating_sub(defaults::CONTEXT_WINDOW));
    let window_end = ceil_char_boundary(text, end + defaults::CONTEXT_WINDOW);
    let context = text[window_start..window_end].to_lowercase();
    if ["chapter", "section", "lesson"]
        .iter()
        .any(|w| context.contains(w))
    {
        confidence += defaults::CONTEXT_BONUS;
    }

    let previous = text[..start].chars().next_back();
    let first = text[start..end].chars().next();
    if let (Some(p), Some(f)) = (previous, first) {
        if p.is_alphanumeric() && f.is_alphanumeric() {
            confidence -= defaults::MID_WORD_PENALTY;
        }
    }

    confidence.clamp(0.0, 1.0)
}

/// Remove overlapping candidates of one category
///
/// The earliest start wins; ties go to the longest span, then to the
/// earlier rule.
pub fn dedupe_same_category(mut candidates: Vec<DetectedElement>) -> Vec<DetectedElement> {
    // Stable sort keeps rule order for equal keys
    candidates.sort_by_key(|e| (e.start, std::cmp::Reverse(e.len())));

    let mut kept: Vec<DetectedElement> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match kept.last() {
            Some(last) if candidate.start < last.end => {
                log::trace!(
                    "dropping {} at {}..{} overlapping {}",
                    candidate.rule_id,
                    candidate.start,
                    candidate.end,
                    last.rule_id
                );
            }
            _ => kept.push(candidate),
        }
    }
    kept
}

/// Grow block elements forward to the next structural boundary
///
/// A grown element stops before the next element of any category, the next
/// section header, a unit start from `unit_starts`, a blank line, or its
/// category maximum, then snaps back to the last sentence end it contains.
fn grow_extents(
    text: &str,
    elements: &mut [DetectedElement],
    policy: &ExtentPolicy,
    unit_starts: &[usize],
) {
    let mut stops: Vec<usize> = elements.iter().map(|e| e.start).collect();
    stops.extend(unit_starts.iter().copied().filter(|s| text.is_char_boundary(*s)));
    stops.extend(SECTION_HEADER.find_iter(text).map(|m| m.start()));
    stops.extend(BLANK_LINE.find_iter(text).map(|m| m.start()));
    stops.sort_unstable();
    stops.dedup();

    for element in elements.iter_mut() {
        let Some(max_len) = policy.max_len(element.category) else {
            continue;
        };

        let cap = floor_char_boundary(text, element.start.saturating_add(max_len));
        let next_stop = stops
            .iter()
            .copied()
            .find(|s| *s >= element.end)
            .unwrap_or(text.len());
        let limit = next_stop.min(cap);
        if limit <= element.end {
            continue;
        }

        let tail = &text[element.end..limit];
        let new_end = match last_sentence_end(tail) {
            Some(i) => element.end + i,
            // No sentence end: take everything up to a real boundary, but
            // never stop at an arbitrary length cap
            None if limit == next_stop => limit,
            None => element.end,
        };

        let new_end = trim_trailing_whitespace(text, element.end, new_end);
        if new_end > element.end {
            element.end = new_end;
            element.text = text[element.start..element.end].to_string();
        }
    }
}

fn trim_trailing_whitespace(text: &str, floor: usize, end: usize) -> usize {
    let trimmed = text[floor..end].trim_end();
    floor + trimmed.len()
}
