//! Structure-aware chunking of educational textbook text
//!
//! This crate turns extracted chapter text into self-contained learning
//! units. Rules are data: each pedagogical category (activities, worked
//! examples, figures, formulas, boxes, questions, cross-references and
//! markers) is described by regex rules in an embedded TOML table.
//!
//! # Pipeline
//!
//! - **Detection**: [`ElementDetector`] applies the [`PatternLibrary`] and
//!   returns non-overlapping elements per category
//! - **Resolution**: [`BoundaryResolver`] groups text into learning units
//!   at section markers, keeping every element whole
//! - **Assembly**: [`ChunkAssembler`] rebuilds the unit text and derives a
//!   content-hash id
//! - **Scoring**: [`MetadataScorer`] and [`MetadataExtractor`] attach quality
//!   scores and pattern-derived metadata
//!
//! # Example
//!
//! ```rust
//! use educhunk_core::{
//!     BoundaryResolver, Category, ChunkAssembler, ElementDetector, MetadataScorer,
//!     PatternLibrary, SectionMarker, SourceDocument,
//! };
//!
//! let text = "8.1 Force\nIntro text. Activity 8.1: push a box. More text.";
//! let document = SourceDocument::new("science-8-ch8", text);
//!
//! let detector = ElementDetector::new(PatternLibrary::embedded().unwrap());
//! let elements = detector.detect(text);
//!
//! let markers = vec![SectionMarker::new(0, "8.1")];
//! let units = BoundaryResolver::new().resolve(text, &elements, &markers).unwrap();
//! assert_eq!(units.len(), 1);
//!
//! let chunk = ChunkAssembler::new().assemble(&document, &units[0]).unwrap();
//! assert_eq!(chunk.text, text);
//! assert_eq!(chunk.count(Category::Activity), 1);
//!
//! let scores = MetadataScorer::new().unwrap().score(&chunk);
//! assert!(scores.aggregate > 0.0);
//! ```

pub mod assembler;
pub mod detector;
pub mod error;
pub mod metadata;
pub mod patterns;
pub mod resolver;
pub mod scorer;
pub mod sections;
mod text;
pub mod types;
pub mod vocabulary;

pub use assembler::{chunk_id, ChunkAssembler};
pub use detector::{DetectorConfig, ElementDetector, ExtentPolicy};
pub use error::{CoreError, Result};
pub use metadata::{Difficulty, MetadataConfig, MetadataExtractor, PatternMetadata};
pub use patterns::{get_pattern_table, list_pattern_tables, PatternLibrary, Rule, DEFAULT_TABLE};
pub use resolver::{BoundaryResolver, ResolverConfig};
pub use scorer::{MetadataScorer, ScoringConfig};
pub use sections::SectionDetector;
pub use types::{
    Category, Chunk, DetectedElement, Dimension, EnrichmentResult, LearningUnit, Piece,
    QualityScores, SectionMarker, SourceDocument, Span,
};
pub use vocabulary::Vocabulary;
