//! Section marker detection
//!
//! Used when the text-extraction step supplies no markers of its own.

use crate::types::SectionMarker;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static NUMBERED_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*((\d{1,2}\.\d{1,2})[ \t]+\p{Lu}[\p{L} ,'()\-]{1,60})[ \t]*$")
        .expect("numbered header pattern is valid")
});

static CHAPTER_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*((?:CHAPTER|Chapter)[ \t]+(\d{1,2}))\b[^\n]*$")
        .expect("chapter header pattern is valid")
});

static END_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*((Summary|SUMMARY|What [Yy]ou [Hh]ave [Ll]earnt|WHAT YOU HAVE LEARNT|Exercises|EXERCISES)[ \t]*:?)[ \t]*$",
    )
    .expect("end matter pattern is valid")
});

/// Finds section starts in extracted text
#[derive(Debug, Clone)]
pub struct SectionDetector {
    include_chapters: bool,
    include_end_matter: bool,
}

impl Default for SectionDetector {
    fn default() -> Self {
        Self {
            include_chapters: true,
            include_end_matter: true,
        }
    }
}

impl SectionDetector {
    /// Create a detector that finds numbered sections, chapters and end matter
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle chapter headings
    pub fn with_chapters(mut self, enabled: bool) -> Self {
        self.include_chapters = enabled;
        self
    }

    /// Toggle summary and exercise headings
    pub fn with_end_matter(mut self, enabled: bool) -> Self {
        self.include_end_matter = enabled;
        self
    }

    /// Markers sorted by offset
    ///
    /// A repeated section number keeps its first occurrence only.
    pub fn detect(&self, text: &str) -> Vec<SectionMarker> {
        let mut markers = Vec::new();
        let mut seen_numbers = HashSet::new();

        for caps in NUMBERED_HEADER.captures_iter(text) {
            let (Some(header), Some(number)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            if !seen_numbers.insert(number.as_str().to_string()) {
                log::debug!("skipping repeated section {} at {}", number.as_str(), header.start());
                continue;
            }
            markers.push(SectionMarker::new(header.start(), number.as_str()));
        }

        if self.include_chapters {
            for caps in CHAPTER_HEADER.captures_iter(text) {
                if let Some(header) = caps.get(1) {
                    markers.push(SectionMarker::new(header.start(), header.as_str()));
                }
            }
        }

        if self.include_end_matter {
            for caps in END_MATTER.captures_iter(text) {
                if let (Some(header), Some(name)) = (caps.get(1), caps.get(2)) {
                    markers.push(SectionMarker::new(header.start(), name.as_str()));
                }
            }
        }

        markers.sort_by_key(|m| m.offset);
        markers.dedup_by_key(|m| m.offset);
        markers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_sections() {
        let text = "8.1 Force\nA push or pull.\n8.2 Balanced Forces\nMore text.";
        let markers = SectionDetector::new().detect(text);
        assert_eq!(
            markers,
            vec![
                SectionMarker::new(0, "8.1"),
                SectionMarker::new(text.find("8.2").unwrap(), "8.2"),
            ]
        );
    }

    #[test]
    fn test_repeated_number_keeps_first() {
        let text = "8.1 Force\nBody.\n8.1 Force\nRunning header repeated.";
        let markers = SectionDetector::new().detect(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].offset, 0);
    }

    #[test]
    fn test_sentences_with_numbers_are_not_headers() {
        let text = "It moved 2.5 Metres in total. Then it stopped.";
        assert!(SectionDetector::new().detect(text).is_empty());
    }

    #[test]
    fn test_chapter_and_end_matter() {
        let text = "CHAPTER 8\nForce and Pressure\n8.1 Force\nText.\nSummary\nForce is a push.\nExercises\n1. What is force?";
        let markers = SectionDetector::new().detect(text);
        let labels: Vec<&str> = markers.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["CHAPTER 8", "8.1", "Summary", "Exercises"]);

        let plain = SectionDetector::new()
            .with_chapters(false)
            .with_end_matter(false)
            .detect(text);
        assert_eq!(plain.len(), 1);
    }

    #[test]
    fn test_indented_header_offset_skips_indent() {
        let text = "Intro.\n  8.3 Friction\nBody.";
        let markers = SectionDetector::new().detect(text);
        assert_eq!(markers[0].offset, text.find("8.3").unwrap());
    }
}
