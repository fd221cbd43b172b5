//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use educhunk_engine::DocumentOutput;
use std::io::Write;

/// JSON formatter - outputs all documents as one JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    documents: Vec<serde_json::Value>,
    pretty: bool,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W, pretty: bool) -> Self {
        Self {
            writer,
            documents: Vec::new(),
            pretty,
        }
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn format_document(&mut self, output: &DocumentOutput) -> Result<()> {
        self.documents.push(serde_json::to_value(output)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.documents)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.documents)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
