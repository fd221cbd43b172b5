//! Shared data model for the chunking pipeline

use crate::error::{CoreError, Result};
use crate::metadata::PatternMetadata;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Semantic category of an educational element
///
/// The declaration order is the canonical order used for sorting, count
/// maps and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Hands-on activity ("Activity 8.1")
    Activity,
    /// Worked example ("Example 3.2")
    Example,
    /// Figure, diagram, graph or table caption or reference
    Figure,
    /// Numbered equation or inline formula
    Formula,
    /// Boxed side content (Do you know?, biography, summary, note)
    SpecialBox,
    /// Question, exercise or quiz item
    Question,
    /// Reference to another section or figure
    CrossReference,
    /// Objectives, prerequisites and level markers
    PedagogicalMarker,
}

impl Category {
    /// Every category in canonical order
    pub const ALL: [Category; 8] = [
        Category::Activity,
        Category::Example,
        Category::Figure,
        Category::Formula,
        Category::SpecialBox,
        Category::Question,
        Category::CrossReference,
        Category::PedagogicalMarker,
    ];

    /// Snake-case name used in rule tables and output
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Activity => "activity",
            Category::Example => "example",
            Category::Figure => "figure",
            Category::Formula => "formula",
            Category::SpecialBox => "special_box",
            Category::Question => "question",
            Category::CrossReference => "cross_reference",
            Category::PedagogicalMarker => "pedagogical_marker",
        }
    }

    /// Position in [`Category::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownCategory(s.to_string()))
    }
}

/// Half-open byte range over a source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `other` lies entirely inside this span
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two spans share at least one byte
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Borrow the text under this span
    pub fn slice<'a>(&self, text: &'a str) -> Result<&'a str> {
        text.get(self.start..self.end).ok_or(CoreError::InvalidSpan {
            start: self.start,
            end: self.end,
            len: text.len(),
        })
    }
}

/// An educational element located in a source text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedElement {
    /// Semantic category
    pub category: Category,
    /// Start offset in the source text
    pub start: usize,
    /// End offset in the source text
    pub end: usize,
    /// Matched text
    pub text: String,
    /// Human-readable label such as "Activity 8.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Id of the rule that produced the element
    pub rule_id: String,
    /// Detection confidence in [0,1]
    pub confidence: f64,
}

impl DetectedElement {
    /// Span of the element
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the element covers no bytes
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Section start supplied by text extraction or section detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarker {
    /// Byte offset where the section begins
    pub offset: usize,
    /// Section label, e.g. "8.1"
    pub label: String,
}

impl SectionMarker {
    /// Create a marker
    pub fn new(offset: usize, label: impl Into<String>) -> Self {
        Self {
            offset,
            label: label.into(),
        }
    }
}

/// Piece of a learning unit in document order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Piece<'a> {
    /// Residual text not covered by any element
    Body(Span),
    /// A detected element
    Element(&'a DetectedElement),
}

impl Piece<'_> {
    /// Span covered by the piece
    pub fn span(&self) -> Span {
        match self {
            Piece::Body(span) => *span,
            Piece::Element(element) => element.span(),
        }
    }
}

/// Contiguous span of source text grouped under one heading
#[derive(Debug, Clone, PartialEq)]
pub struct LearningUnit {
    /// Heading of the section the unit belongs to
    pub heading: Option<String>,
    /// Residual text spans in document order
    pub body_spans: Vec<Span>,
    /// Absorbed elements per category, each list in document order
    pub elements: BTreeMap<Category, Vec<DetectedElement>>,
    /// Range of the source text covered by the unit
    pub position_range: Span,
}

impl LearningUnit {
    /// Length of the unit in bytes
    pub fn len(&self) -> usize {
        self.position_range.len()
    }

    /// Whether the unit covers no bytes
    pub fn is_empty(&self) -> bool {
        self.position_range.is_empty()
    }

    /// Number of absorbed elements over all categories
    pub fn element_count(&self) -> usize {
        self.elements.values().map(Vec::len).sum()
    }

    /// Absorbed elements of every category in document order
    pub fn ordered_elements(&self) -> Vec<&DetectedElement> {
        let mut all: Vec<&DetectedElement> = self.elements.values().flatten().collect();
        all.sort_by_key(|e| (e.start, e.end));
        all
    }

    /// Body spans and elements merged in document order
    pub fn pieces(&self) -> Vec<Piece<'_>> {
        let mut pieces: Vec<Piece<'_>> = self
            .body_spans
            .iter()
            .map(|span| Piece::Body(*span))
            .chain(self.elements.values().flatten().map(Piece::Element))
            .collect();
        pieces.sort_by_key(|p| (p.span().start, p.span().end));
        pieces
    }

    /// Check that body and element spans tile the position range exactly once
    pub fn verify_coverage(&self) -> Result<()> {
        let range = self.position_range;
        let mut cursor = range.start;

        for piece in self.pieces() {
            let span = piece.span();
            if span.is_empty() {
                return Err(CoreError::coverage(
                    range.start,
                    range.end,
                    format!("empty piece at {}", span.start),
                ));
            }
            if span.start > cursor {
                return Err(CoreError::coverage(
                    range.start,
                    range.end,
                    format!("gap at {}..{}", cursor, span.start),
                ));
            }
            if span.start < cursor {
                return Err(CoreError::coverage(
                    range.start,
                    range.end,
                    format!("overlap at {}..{}", span.start, cursor),
                ));
            }
            cursor = span.end;
        }

        if cursor != range.end {
            return Err(CoreError::coverage(
                range.start,
                range.end,
                format!("uncovered tail {}..{}", cursor, range.end),
            ));
        }

        Ok(())
    }
}

/// Plain text of a document plus its curriculum context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable document identifier
    pub id: String,
    /// Extracted text
    pub text: String,
    /// Subject, e.g. "science"
    #[serde(default)]
    pub subject: Option<String>,
    /// School grade
    #[serde(default)]
    pub grade: Option<u8>,
}

impl SourceDocument {
    /// Create a document without curriculum context
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            subject: None,
            grade: None,
        }
    }

    /// Set the subject
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the grade
    pub fn with_grade(mut self, grade: u8) -> Self {
        self.grade = Some(grade);
        self
    }
}

/// Quality dimension computed by the scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Sentences that end with terminal punctuation
    Completeness,
    /// Absence of repetition and broken starts
    Coherence,
    /// Share of candidate terms that look like real concepts
    ConceptQuality,
    /// Density of activities, examples and questions
    ApplicationQuality,
    /// Presence of introduction, practice and conclusion
    StructuralCompleteness,
    /// Flesch reading ease, normalized
    Readability,
}

impl Dimension {
    /// Every dimension in canonical order
    pub const ALL: [Dimension; 6] = [
        Dimension::Completeness,
        Dimension::Coherence,
        Dimension::ConceptQuality,
        Dimension::ApplicationQuality,
        Dimension::StructuralCompleteness,
        Dimension::Readability,
    ];

    /// Snake-case name used in output
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Completeness => "completeness",
            Dimension::Coherence => "coherence",
            Dimension::ConceptQuality => "concept_quality",
            Dimension::ApplicationQuality => "application_quality",
            Dimension::StructuralCompleteness => "structural_completeness",
            Dimension::Readability => "readability",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| CoreError::Configuration(format!("unknown quality dimension: {s}")))
    }
}

/// Per-dimension scores plus their aggregate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityScores {
    /// Score per dimension, each in [0,1]
    pub dimensions: BTreeMap<Dimension, f64>,
    /// Mean of the dimensions, in [0,1]
    pub aggregate: f64,
}

impl QualityScores {
    /// Score of one dimension, 0.0 when absent
    pub fn get(&self, dimension: Dimension) -> f64 {
        self.dimensions.get(&dimension).copied().unwrap_or(0.0)
    }
}

/// Optional metadata suggested by an external text-generation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    /// Suggested key concepts
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Suggested learning objectives
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Suggested common misconceptions
    #[serde(default)]
    pub misconceptions: Vec<String>,
    /// Suggested difficulty level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

impl EnrichmentResult {
    /// Whether the service provided nothing at all
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
            && self.objectives.is_empty()
            && self.misconceptions.is_empty()
            && self.difficulty.is_none()
    }
}

/// Immutable output record for one learning unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Content-derived identifier
    #[serde(rename = "chunk_id")]
    pub id: String,
    /// Identifier of the source document
    #[serde(rename = "source_document_id")]
    pub source_document: String,
    /// Range of the source text the chunk covers
    pub position_range: Span,
    /// Section heading
    #[serde(default)]
    pub heading: Option<String>,
    /// Unit text in document order
    pub text: String,
    /// Number of elements per category
    pub category_counts: BTreeMap<Category, usize>,
    /// Elements aggregated from the unit
    #[serde(default)]
    pub elements: Vec<DetectedElement>,
    /// Score per quality dimension
    #[serde(default)]
    pub quality_scores: BTreeMap<Dimension, f64>,
    /// Mean quality score
    #[serde(default)]
    pub aggregate_quality: f64,
    /// Pattern-derived metadata
    #[serde(default)]
    pub metadata: PatternMetadata,
    /// Non-authoritative suggestions from the enrichment service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentResult>,
}

impl Chunk {
    /// Number of elements of one category
    pub fn count(&self, category: Category) -> usize {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    /// Number of elements over all categories
    pub fn total_elements(&self) -> usize {
        self.category_counts.values().sum()
    }

    /// Attach quality scores
    pub fn with_quality(mut self, scores: QualityScores) -> Self {
        self.quality_scores = scores.dimensions;
        self.aggregate_quality = scores.aggregate;
        self
    }

    /// Attach pattern-derived metadata
    pub fn with_metadata(mut self, metadata: PatternMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach enrichment output
    pub fn with_enrichment(mut self, enrichment: Option<EnrichmentResult>) -> Self {
        self.enrichment = enrichment;
        self
    }
}
