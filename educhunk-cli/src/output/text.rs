//! Plain text output formatter

use super::{preview, OutputFormatter};
use anyhow::Result;
use educhunk_engine::DocumentOutput;
use std::io::Write;

const PREVIEW_CHARS: usize = 80;

/// Plain text formatter - one line per chunk
pub struct TextFormatter<W: Write> {
    writer: W,
    include_metadata: bool,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W, include_metadata: bool) -> Self {
        Self {
            writer,
            include_metadata,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn format_document(&mut self, output: &DocumentOutput) -> Result<()> {
        writeln!(
            self.writer,
            "{} ({} chunks)",
            output.document_id,
            output.chunks.len()
        )?;

        for chunk in &output.chunks {
            writeln!(
                self.writer,
                "  [{}] {} quality={:.2} elements={}",
                chunk.id,
                chunk.heading.as_deref().unwrap_or("-"),
                chunk.aggregate_quality,
                chunk.total_elements()
            )?;

            if self.include_metadata {
                let scores: Vec<String> = chunk
                    .quality_scores
                    .iter()
                    .map(|(dimension, score)| format!("{dimension}={score:.2}"))
                    .collect();
                writeln!(self.writer, "    scores: {}", scores.join(" "))?;
                writeln!(
                    self.writer,
                    "    difficulty: {} ({} min)",
                    chunk.metadata.difficulty, chunk.metadata.estimated_minutes
                )?;
                if !chunk.metadata.key_concepts.is_empty() {
                    writeln!(
                        self.writer,
                        "    concepts: {}",
                        chunk.metadata.key_concepts.join(", ")
                    )?;
                }
            }

            writeln!(self.writer, "    {}", preview(&chunk.text, PREVIEW_CHARS))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::scenario_output;
    use super::*;

    fn render(include_metadata: bool) -> String {
        let mut buffer = Vec::new();
        {
            let mut formatter = TextFormatter::new(&mut buffer, include_metadata);
            formatter.format_document(&scenario_output()).unwrap();
            formatter.finish().unwrap();
        }
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_one_line_per_chunk() {
        let text = render(false);
        assert!(text.starts_with("science-8-ch8 (1 chunks)"));
        assert!(text.contains("8.1 Force quality="));
        assert!(text.contains("Activity 8.1: push a box."));
        assert!(!text.contains("scores:"));
    }

    #[test]
    fn test_metadata_lines() {
        let text = render(true);
        assert!(text.contains("scores: "));
        assert!(text.contains("completeness=1.00"));
        assert!(text.contains("difficulty: "));
    }
}
