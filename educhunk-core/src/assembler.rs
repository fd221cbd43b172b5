//! Chunk assembly
//!
//! Turns a learning unit into an immutable chunk record. The text is
//! rebuilt from the unit's pieces in document order, so every source byte
//! of the unit appears exactly once.

use crate::error::{CoreError, Result};
use crate::metadata::PatternMetadata;
use crate::types::{Category, Chunk, LearningUnit, Piece, SourceDocument};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Builds chunks from learning units
#[derive(Debug, Clone, Default)]
pub struct ChunkAssembler;

impl ChunkAssembler {
    /// Create an assembler
    pub fn new() -> Self {
        Self
    }

    /// Assemble one unit of `document` into a chunk
    ///
    /// Quality scores, metadata and enrichment start empty and are attached
    /// by later stages.
    pub fn assemble(&self, document: &SourceDocument, unit: &LearningUnit) -> Result<Chunk> {
        let range = unit.position_range;
        let source = document.text.as_str();
        range.slice(source)?;

        let mut text = String::with_capacity(range.len());
        let mut cursor = range.start;
        for piece in unit.pieces() {
            let span = piece.span();
            if span.start != cursor {
                return Err(CoreError::coverage(
                    range.start,
                    range.end,
                    format!("piece at {} does not continue from {}", span.start, cursor),
                ));
            }
            match piece {
                Piece::Body(span) => text.push_str(span.slice(source)?),
                Piece::Element(element) => {
                    let slice = span.slice(source)?;
                    if slice != element.text {
                        return Err(CoreError::coverage(
                            range.start,
                            range.end,
                            format!(
                                "element text at {}..{} differs from the source",
                                span.start, span.end
                            ),
                        ));
                    }
                    text.push_str(slice);
                }
            }
            cursor = span.end;
        }
        if cursor != range.end {
            return Err(CoreError::coverage(
                range.start,
                range.end,
                format!("assembled text stops at {cursor}"),
            ));
        }

        let category_counts: BTreeMap<Category, usize> = Category::ALL
            .iter()
            .map(|c| (*c, unit.elements.get(c).map_or(0, Vec::len)))
            .collect();

        let elements = unit.ordered_elements().into_iter().cloned().collect();

        Ok(Chunk {
            id: chunk_id(&document.id, range.start, range.end, &text),
            source_document: document.id.clone(),
            position_range: range,
            heading: unit.heading.clone(),
            text,
            category_counts,
            elements,
            quality_scores: BTreeMap::new(),
            aggregate_quality: 0.0,
            metadata: PatternMetadata::default(),
            enrichment: None,
        })
    }

    /// Assemble every unit, stopping at the first failure
    pub fn assemble_all(
        &self,
        document: &SourceDocument,
        units: &[LearningUnit],
    ) -> Result<Vec<Chunk>> {
        units.iter().map(|u| self.assemble(document, u)).collect()
    }
}

/// Content-derived chunk id (32 hex chars)
///
/// Identical document id, position and text always give the same id.
pub fn chunk_id(document_id: &str, start: usize, end: usize, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(start.to_le_bytes());
    hasher.update(end.to_le_bytes());
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}
