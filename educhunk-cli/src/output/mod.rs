//! Output formatting module

use anyhow::Result;
use educhunk_engine::DocumentOutput;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output the chunks of one document
    fn format_document(&mut self, output: &DocumentOutput) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod markdown;
pub mod text;

pub use json::JsonFormatter;
pub use markdown::MarkdownFormatter;
pub use text::TextFormatter;

/// One-line preview of a chunk's text
pub(crate) fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
