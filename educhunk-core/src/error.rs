//! Core error types (deterministic only)

use thiserror::Error;

/// Errors raised by detection, resolution and assembly.
///
/// None of these involve I/O apart from `Configuration`, which also covers
/// a pattern table file that cannot be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A category name that the pattern library does not know
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Section markers that cannot be ordered into disjoint units
    #[error("ambiguous section boundary at offset {offset}: {reason}")]
    AmbiguousSectionBoundary {
        /// Byte offset of the offending marker
        offset: usize,
        /// What made the marker ambiguous
        reason: String,
    },

    /// Body and element spans of a unit do not tile its range
    #[error("coverage invariant violated for unit {start}..{end}: {reason}")]
    CoverageInvariantViolation {
        /// Start of the unit range
        start: usize,
        /// End of the unit range
        end: usize,
        /// First gap or overlap found
        reason: String,
    },

    /// A span that does not fit the text it refers to
    #[error("invalid span {start}..{end} for text of length {len}")]
    InvalidSpan {
        /// Span start
        start: usize,
        /// Span end
        end: usize,
        /// Length of the text
        len: usize,
    },

    /// Malformed rule table or invalid settings
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Shorthand for a coverage violation
    pub(crate) fn coverage(start: usize, end: usize, reason: impl Into<String>) -> Self {
        CoreError::CoverageInvariantViolation {
            start,
            end,
            reason: reason.into(),
        }
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::UnknownCategory("poem".to_string());
        assert_eq!(err.to_string(), "unknown category: poem");

        let err = CoreError::AmbiguousSectionBoundary {
            offset: 12,
            reason: "duplicate marker".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ambiguous section boundary at offset 12: duplicate marker"
        );

        let err = CoreError::coverage(0, 10, "gap at 4..6");
        assert_eq!(
            err.to_string(),
            "coverage invariant violated for unit 0..10: gap at 4..6"
        );
    }
}
