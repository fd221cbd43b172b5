//! End-to-end tests for detection, resolution, assembly and scoring

use educhunk_core::{
    BoundaryResolver, Category, Chunk, ChunkAssembler, Dimension, ElementDetector,
    MetadataExtractor, MetadataScorer, PatternLibrary, SectionDetector, SectionMarker,
    SourceDocument,
};

const CHAPTER: &str = "CHAPTER 8
Force and Pressure
8.1 Force
A push or a pull on an object is called force. Activity 8.1: Push a heavy box across the floor.
Observe how the box moves (Fig. 8.1).
Fig. 8.1: A box being pushed
8.2 Friction
Friction opposes motion. Example 8.2 A block of mass 2 kg slides on a table.
F = m × a
Summary
Force is a push or a pull.
Exercises
1. What is force?
";

fn run(document: &SourceDocument, markers: &[SectionMarker]) -> Vec<Chunk> {
    let detector = ElementDetector::new(PatternLibrary::embedded().unwrap());
    let elements = detector.detect(&document.text);
    let units = BoundaryResolver::new()
        .resolve(&document.text, &elements, markers)
        .unwrap();

    let scorer = MetadataScorer::new().unwrap();
    let extractor = MetadataExtractor::new().unwrap();
    ChunkAssembler::new()
        .assemble_all(document, &units)
        .unwrap()
        .into_iter()
        .map(|chunk| {
            let metadata = extractor.extract(&chunk);
            scorer.apply(chunk).with_metadata(metadata)
        })
        .collect()
}

#[test]
fn test_minimal_scenario() {
    let text = "8.1 Force\nIntro text. Activity 8.1: push a box. More text.";
    let document = SourceDocument::new("science-8-ch8", text);
    let chunks = run(&document, &[SectionMarker::new(0, "8.1")]);

    assert_eq!(chunks.len(), 1);
    let chunk = &chunks[0];
    assert_eq!(chunk.text, text);
    assert_eq!(chunk.count(Category::Activity), 1);
    assert_eq!(chunk.elements[0].label.as_deref(), Some("Activity 8.1"));
    assert!(chunk.aggregate_quality > 0.0);
}

#[test]
fn test_chapter_with_detected_sections() {
    let document = SourceDocument::new("science-8-ch8", CHAPTER)
        .with_subject("science")
        .with_grade(8);
    let markers = SectionDetector::new().detect(CHAPTER);
    let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
    assert_eq!(labels, vec!["CHAPTER 8", "8.1", "8.2", "Summary", "Exercises"]);

    let chunks = run(&document, &markers);
    assert_eq!(chunks.len(), 5);

    let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(rebuilt, CHAPTER);

    let force = &chunks[1];
    assert_eq!(force.heading.as_deref(), Some("8.1 Force"));
    assert_eq!(force.count(Category::Activity), 1);
    assert_eq!(force.count(Category::Figure), 1);
    assert!(force
        .metadata
        .key_concepts
        .iter()
        .any(|c| c.eq_ignore_ascii_case("force")));

    let friction = &chunks[2];
    assert_eq!(friction.count(Category::Example), 1);
    assert!(friction.count(Category::Formula) >= 1);

    let exercises = &chunks[4];
    assert!(exercises.count(Category::Question) >= 1);
    assert!(exercises
        .elements
        .iter()
        .any(|e| e.text.trim() == "1. What is force?"));
}

#[test]
fn test_scores_bounded_for_every_chunk() {
    let document = SourceDocument::new("science-8-ch8", CHAPTER);
    let chunks = run(&document, &SectionDetector::new().detect(CHAPTER));
    for chunk in &chunks {
        assert_eq!(chunk.quality_scores.len(), Dimension::ALL.len());
        for score in chunk.quality_scores.values() {
            assert!((0.0..=1.0).contains(score), "{} out of range", score);
        }
        assert!((0.0..=1.0).contains(&chunk.aggregate_quality));
    }
}

#[test]
fn test_without_markers_whole_text_is_one_unit() {
    let document = SourceDocument::new("notes", "Friction opposes motion. It produces heat.");
    let chunks = run(&document, &[]);
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].heading.is_none());
    assert_eq!(chunks[0].text, document.text);
}

#[test]
fn test_hindi_activity_detected() {
    let text = "गतिविधि 3.1: एक गिलास में पानी लें। फिर देखें।";
    let detector = ElementDetector::new(PatternLibrary::embedded().unwrap());
    let activities = detector.detect_category(text, Category::Activity);
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].label.as_deref(), Some("गतिविधि 3.1"));
    assert!(activities[0].text.ends_with('।'));
}

#[test]
fn test_processing_is_deterministic() {
    let document = SourceDocument::new("science-8-ch8", CHAPTER);
    let markers = SectionDetector::new().detect(CHAPTER);
    assert_eq!(run(&document, &markers), run(&document, &markers));
}

#[test]
fn test_chunks_serialize_with_record_field_names() {
    let document = SourceDocument::new("science-8-ch8", CHAPTER);
    let chunks = run(&document, &SectionDetector::new().detect(CHAPTER));
    let value = serde_json::to_value(&chunks[1]).unwrap();
    assert!(value.get("chunk_id").is_some());
    assert_eq!(value["source_document_id"], "science-8-ch8");
    assert_eq!(value["category_counts"]["activity"], 1);
    assert!(value["quality_scores"]["completeness"].is_number());
}
