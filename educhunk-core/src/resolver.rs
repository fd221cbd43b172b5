//! Boundary resolution
//!
//! Partitions a document into learning units. Each unit's residual text is
//! the complement of its element spans, computed once by sorted-interval
//! subtraction, so body and element spans tile the unit exactly.

use crate::error::{CoreError, Result};
use crate::text::{break_offsets, words};
use crate::types::{Category, DetectedElement, LearningUnit, SectionMarker, Span};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Default resolver settings
pub mod defaults {
    /// Units longer than this many bytes are split
    pub const MAX_UNIT_LEN: usize = 2000;

    /// Longest heading taken from the marker line
    pub const MAX_HEADING_LEN: usize = 120;

    /// Units with fewer words are reported as thin
    pub const MIN_UNIT_WORDS: usize = 50;
}

/// Resolver settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Units longer than this many bytes are split
    pub max_unit_len: usize,
    /// Cut at a sentence or paragraph break when a unit has no element boundary
    pub sentence_fallback: bool,
    /// Units with fewer words are reported as thin
    pub min_unit_words: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_unit_len: defaults::MAX_UNIT_LEN,
            sentence_fallback: true,
            min_unit_words: defaults::MIN_UNIT_WORDS,
        }
    }
}

impl ResolverConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_unit_len == 0 {
            return Err(CoreError::Configuration(
                "max_unit_len must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Splits a document into learning units
#[derive(Debug, Clone, Default)]
pub struct BoundaryResolver {
    config: ResolverConfig,
}

/// Unit range before elements are absorbed
struct UnitFrame {
    range: Span,
    heading: Option<String>,
}

impl BoundaryResolver {
    /// Create a resolver with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom settings
    pub fn with_config(config: ResolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Current settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Partition `text` into learning units in document order
    pub fn resolve(
        &self,
        text: &str,
        elements: &[DetectedElement],
        markers: &[SectionMarker],
    ) -> Result<Vec<LearningUnit>> {
        if text.is_empty() {
            return Ok(Vec::new());
        }

        for element in elements {
            element.span().slice(text)?;
        }

        let frames = unit_frames(text, markers)?;
        let kept = resolve_cross_category_overlaps(elements);

        let mut units = Vec::with_capacity(frames.len());
        let mut pending = kept.into_iter().peekable();

        for frame in frames {
            let mut absorbed = Vec::new();
            while let Some(element) = pending.next_if(|e| e.start < frame.range.end) {
                if element.end <= frame.range.end && element.start >= frame.range.start {
                    absorbed.push(element);
                } else {
                    log::debug!(
                        "{} element at {}..{} straddles unit boundary {}, kept as body text",
                        element.category,
                        element.start,
                        element.end,
                        frame.range.end
                    );
                }
            }

            let unit = build_unit(frame.range, frame.heading, absorbed)?;
            self.split_oversized(text, unit, &mut units)?;
        }

        for unit in &units {
            let word_count = unit
                .position_range
                .slice(text)
                .map(|s| words(s).count())
                .unwrap_or(0);
            if word_count < self.config.min_unit_words {
                log::debug!(
                    "thin unit {}..{} ({} words)",
                    unit.position_range.start,
                    unit.position_range.end,
                    word_count
                );
            }
        }

        Ok(units)
    }

    fn split_oversized(
        &self,
        text: &str,
        unit: LearningUnit,
        out: &mut Vec<LearningUnit>,
    ) -> Result<()> {
        if unit.len() <= self.config.max_unit_len {
            out.push(unit);
            return Ok(());
        }

        match self.find_cut(text, &unit) {
            Some(cut) => {
                let (left, right) = split_unit(unit, cut)?;
                self.split_oversized(text, left, out)?;
                self.split_oversized(text, right, out)
            }
            None => {
                log::warn!(
                    "unit {}..{} exceeds {} bytes but has no split point",
                    unit.position_range.start,
                    unit.position_range.end,
                    self.config.max_unit_len
                );
                out.push(unit);
                Ok(())
            }
        }
    }

    /// Element boundary closest to the midpoint, or a body break as fallback
    fn find_cut(&self, text: &str, unit: &LearningUnit) -> Option<usize> {
        let range = unit.position_range;
        let mid = range.start + range.len() / 2;
        let inside = |x: &usize| range.start < *x && *x < range.end;

        let element_cuts = unit
            .elements
            .values()
            .flatten()
            .flat_map(|e| [e.start, e.end])
            .filter(inside);

        if let Some(cut) = nearest(element_cuts, mid) {
            return Some(cut);
        }

        if !self.config.sentence_fallback {
            return None;
        }

        let body_cuts = unit.body_spans.iter().flat_map(|span| {
            let offsets = span
                .slice(text)
                .map(break_offsets)
                .unwrap_or_default();
            offsets.into_iter().map(move |o| span.start + o)
        });
        nearest(body_cuts.filter(inside), mid)
    }
}

/// Candidate closest to `mid`; ties go to the earlier offset
fn nearest(candidates: impl Iterator<Item = usize>, mid: usize) -> Option<usize> {
    candidates.min_by_key(|x| (x.abs_diff(mid), *x))
}

/// Compute unit ranges and headings from the section markers
fn unit_frames(text: &str, markers: &[SectionMarker]) -> Result<Vec<UnitFrame>> {
    let mut sorted: Vec<&SectionMarker> = markers.iter().collect();
    sorted.sort_by_key(|m| m.offset);

    let mut starts: Vec<(usize, Option<String>)> = Vec::with_capacity(sorted.len());
    let mut previous: Option<(usize, usize)> = None;

    for marker in sorted {
        if marker.offset > text.len() {
            return Err(CoreError::AmbiguousSectionBoundary {
                offset: marker.offset,
                reason: format!("marker beyond end of text ({} bytes)", text.len()),
            });
        }
        if !text.is_char_boundary(marker.offset) {
            return Err(CoreError::AmbiguousSectionBoundary {
                offset: marker.offset,
                reason: "marker is not on a character boundary".into(),
            });
        }
        if let Some((prev_offset, heading_end)) = previous {
            if marker.offset == prev_offset {
                return Err(CoreError::AmbiguousSectionBoundary {
                    offset: marker.offset,
                    reason: "two markers at the same offset".into(),
                });
            }
            if marker.offset < heading_end {
                return Err(CoreError::AmbiguousSectionBoundary {
                    offset: marker.offset,
                    reason: format!("marker falls inside the heading of marker at {prev_offset}"),
                });
            }
        }
        if marker.offset == text.len() {
            log::debug!("ignoring marker '{}' at end of text", marker.label);
            continue;
        }

        let (heading_end, heading) = heading_at(text, marker);
        previous = Some((marker.offset, heading_end));
        starts.push((marker.offset, Some(heading)));
    }

    if starts.is_empty() {
        return Ok(vec![UnitFrame {
            range: Span::new(0, text.len()),
            heading: None,
        }]);
    }

    let mut frames = Vec::with_capacity(starts.len() + 1);
    if starts[0].0 > 0 {
        if text[..starts[0].0].trim().is_empty() {
            starts[0].0 = 0;
        } else {
            frames.push(UnitFrame {
                range: Span::new(0, starts[0].0),
                heading: None,
            });
        }
    }

    for (i, (start, heading)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map_or(text.len(), |(next, _)| *next);
        frames.push(UnitFrame {
            range: Span::new(*start, end),
            heading: heading.clone(),
        });
    }

    Ok(frames)
}

/// Heading extent end and heading text of a marker
///
/// The heading is the marker's line, capped in length. Without a line break
/// in reach only the label itself counts as heading.
fn heading_at(text: &str, marker: &SectionMarker) -> (usize, String) {
    let rest = &text[marker.offset..];
    let window_end = crate::text::floor_char_boundary(rest, defaults::MAX_HEADING_LEN);

    let extent = match rest[..window_end].find('\n') {
        Some(newline) => newline,
        None if window_end == rest.len() => rest.len(),
        None if rest.starts_with(marker.label.as_str()) => marker.label.len(),
        None => 0,
    };

    let heading = rest[..extent].trim();
    let heading = if heading.is_empty() {
        marker.label.clone()
    } else {
        heading.to_string()
    };
    (marker.offset + extent, heading)
}

/// Drop elements that overlap an element of another category
///
/// Earliest start wins, then the longest span, then category order.
pub fn resolve_cross_category_overlaps(elements: &[DetectedElement]) -> Vec<DetectedElement> {
    let mut sorted: Vec<&DetectedElement> = elements.iter().collect();
    sorted.sort_by_key(|e| (e.start, Reverse(e.len()), e.category));

    let mut kept: Vec<DetectedElement> = Vec::with_capacity(sorted.len());
    let mut covered_to = 0;
    for element in sorted {
        if element.is_empty() {
            continue;
        }
        if !kept.is_empty() && element.start < covered_to {
            log::debug!(
                "dropping {} element at {}..{} overlapping an earlier element",
                element.category,
                element.start,
                element.end
            );
            continue;
        }
        covered_to = element.end;
        kept.push(element.clone());
    }
    kept
}

/// Parts of `range` not covered by `covered`
///
/// `covered` must be sorted, pairwise disjoint and inside `range`.
pub fn residual_spans(range: Span, covered: &[Span]) -> Vec<Span> {
    let mut residual = Vec::with_capacity(covered.len() + 1);
    let mut cursor = range.start;
    for span in covered {
        if span.start > cursor {
            residual.push(Span::new(cursor, span.start));
        }
        cursor = cursor.max(span.end);
    }
    if cursor < range.end {
        residual.push(Span::new(cursor, range.end));
    }
    residual
}

fn build_unit(
    range: Span,
    heading: Option<String>,
    absorbed: Vec<DetectedElement>,
) -> Result<LearningUnit> {
    let covered: Vec<Span> = absorbed.iter().map(DetectedElement::span).collect();
    let body_spans = residual_spans(range, &covered);

    let mut elements: BTreeMap<Category, Vec<DetectedElement>> = BTreeMap::new();
    for element in absorbed {
        elements.entry(element.category).or_default().push(element);
    }

    let unit = LearningUnit {
        heading,
        body_spans,
        elements,
        position_range: range,
    };
    unit.verify_coverage()?;
    Ok(unit)
}

/// Split a unit at `cut`, which must not fall inside an element
fn split_unit(unit: LearningUnit, cut: usize) -> Result<(LearningUnit, LearningUnit)> {
    let range = unit.position_range;
    let mut left_elements = Vec::new();
    let mut right_elements = Vec::new();

    for element in unit.elements.into_values().flatten() {
        if element.end <= cut {
            left_elements.push(element);
        } else if element.start >= cut {
            right_elements.push(element);
        } else {
            return Err(CoreError::coverage(
                range.start,
                range.end,
                format!("cut at {cut} falls inside element {}..{}", element.start, element.end),
            ));
        }
    }
    left_elements.sort_by_key(|e| e.start);
    right_elements.sort_by_key(|e| e.start);

    let left = build_unit(
        Span::new(range.start, cut),
        unit.heading.clone(),
        left_elements,
    )?;
    let right = build_unit(Span::new(cut, range.end), unit.heading, right_elements)?;
    Ok((left, right))
}
