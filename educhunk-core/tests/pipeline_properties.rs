//! Property-based tests for the chunking pipeline
//!
//! Invariants:
//! - Units partition the text: contiguous, in order, nothing lost
//! - Every kept element lands in exactly one chunk, whole
//! - Scores stay within [0,1]
//! - Processing the same input twice gives the same chunks

use educhunk_core::{
    BoundaryResolver, Chunk, ChunkAssembler, ElementDetector, MetadataScorer, PatternLibrary,
    ResolverConfig, SectionDetector, SourceDocument,
};
use proptest::prelude::*;
use std::collections::HashMap;

const FRAGMENTS: &[&str] = &[
    "8.1 Force\n",
    "8.2 Friction\n",
    "Activity 8.1: push a box. ",
    "Example 3.2 A cart of mass 2 kg moves. ",
    "Fig. 8.3: A spring balance\n",
    "F = m × a ",
    "Intro text. ",
    "See Fig. 8.3 for details. ",
    "Questions\n",
    "1. What is force?\n",
    "\n\n",
    "Summary\n",
    "बल एक धक्का है। ",
    "the block slides ",
    "DO YOU KNOW? Ice floats.\n",
];

fn textbook_text() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40)
        .prop_map(|parts| parts.concat())
}

fn process(text: &str, max_unit_len: usize) -> Vec<Chunk> {
    let document = SourceDocument::new("prop-doc", text);
    let detector = ElementDetector::new(PatternLibrary::embedded().unwrap());
    let elements = detector.detect(text);
    let markers = SectionDetector::new().detect(text);
    let resolver = BoundaryResolver::with_config(ResolverConfig {
        max_unit_len,
        ..ResolverConfig::default()
    })
    .unwrap();
    let units = resolver.resolve(text, &elements, &markers).unwrap();

    let scorer = MetadataScorer::new().unwrap();
    ChunkAssembler::new()
        .assemble_all(&document, &units)
        .unwrap()
        .into_iter()
        .map(|c| scorer.apply(c))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn units_partition_the_text(text in textbook_text(), max_len in 40usize..400) {
        let chunks = process(&text, max_len);

        if text.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks[0].position_range.start, 0);
            prop_assert_eq!(chunks[chunks.len() - 1].position_range.end, text.len());
            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[0].position_range.end, pair[1].position_range.start);
            }
        }

        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
        prop_assert_eq!(rebuilt, text);
    }

    #[test]
    fn elements_are_never_duplicated_or_split(text in textbook_text()) {
        let chunks = process(&text, 2000);
        let mut seen: HashMap<(usize, usize), usize> = HashMap::new();

        for chunk in &chunks {
            for element in &chunk.elements {
                prop_assert!(chunk.position_range.start <= element.start);
                prop_assert!(element.end <= chunk.position_range.end);
                prop_assert_eq!(&text[element.start..element.end], element.text.as_str());
                *seen.entry((element.start, element.end)).or_default() += 1;
            }
            let counted: usize = chunk.category_counts.values().sum();
            prop_assert_eq!(counted, chunk.elements.len());
        }

        prop_assert!(seen.values().all(|n| *n == 1));
    }

    #[test]
    fn scores_are_bounded(text in textbook_text()) {
        for chunk in process(&text, 2000) {
            prop_assert!((0.0..=1.0).contains(&chunk.aggregate_quality));
            for score in chunk.quality_scores.values() {
                prop_assert!((0.0..=1.0).contains(score));
            }
        }
    }

    #[test]
    fn processing_is_idempotent(text in textbook_text()) {
        prop_assert_eq!(process(&text, 300), process(&text, 300));
    }
}
