//! Markdown output formatter

use super::OutputFormatter;
use anyhow::Result;
use educhunk_engine::DocumentOutput;
use std::io::Write;

/// Markdown formatter - one section per chunk with a score table
pub struct MarkdownFormatter<W: Write> {
    writer: W,
    chunk_count: usize,
}

impl<W: Write> MarkdownFormatter<W> {
    /// Create a new markdown formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            chunk_count: 0,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for MarkdownFormatter<W> {
    fn format_document(&mut self, output: &DocumentOutput) -> Result<()> {
        writeln!(self.writer, "# {}", output.document_id)?;
        writeln!(self.writer)?;

        for chunk in &output.chunks {
            self.chunk_count += 1;
            writeln!(
                self.writer,
                "## {}. {}",
                self.chunk_count,
                chunk.heading.as_deref().unwrap_or("(untitled)")
            )?;
            writeln!(self.writer)?;
            writeln!(
                self.writer,
                "*Chunk `{}`, bytes {}..{}, quality {:.2}*",
                chunk.id,
                chunk.position_range.start,
                chunk.position_range.end,
                chunk.aggregate_quality
            )?;
            writeln!(self.writer)?;

            writeln!(self.writer, "| Dimension | Score |")?;
            writeln!(self.writer, "|---|---|")?;
            for (dimension, score) in &chunk.quality_scores {
                writeln!(self.writer, "| {dimension} | {score:.2} |")?;
            }
            writeln!(self.writer)?;

            let counts: Vec<String> = chunk
                .category_counts
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(category, count)| format!("{category}: {count}"))
                .collect();
            if !counts.is_empty() {
                writeln!(self.writer, "Elements: {}", counts.join(", "))?;
                writeln!(self.writer)?;
            }

            for line in chunk.text.lines() {
                writeln!(self.writer, "> {line}")?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer, "---")?;
        writeln!(self.writer, "*Total chunks: {}*", self.chunk_count)?;
        self.writer.flush()?;
        Ok(())
    }
}
