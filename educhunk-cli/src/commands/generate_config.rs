//! Generate config command implementation

use crate::config::{EnrichmentSection, OutputConfig, ProcessingConfig, ScoringSection};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the generate-config command
#[derive(Debug, Args)]
pub struct GenerateConfigArgs {
    /// Output file path
    #[arg(short, long, value_name = "FILE", required = true)]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl GenerateConfigArgs {
    /// Execute the generate-config command
    pub fn execute(&self) -> Result<()> {
        use std::fs;

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        println!("Generating configuration template...");
        println!("  Output file: {}", self.output.display());

        fs::write(&self.output, generate_template())
            .with_context(|| format!("Failed to write to {}", self.output.display()))?;

        println!("✓ Configuration template generated successfully!");
        println!();
        println!("Use it for processing:");
        println!(
            "   educhunk process -i 'chapters/*.txt' --config {}",
            self.output.display()
        );

        Ok(())
    }
}

/// Commented template holding every default value
pub fn generate_template() -> String {
    let processing = ProcessingConfig::default();
    let scoring = ScoringSection::default();
    let enrichment = EnrichmentSection::default();
    let output = OutputConfig::default();

    format!(
        r#"# educhunk configuration
#
# Every value below is the built-in default; delete lines you do not change.
# Command-line flags override this file.

[processing]
# Embedded pattern table (see `educhunk list tables`)
table = "{table}"

# Keep only rules for one language: "en" or "hi" (default: all rules)
# language = "en"

# Detections below this confidence are dropped
min_confidence = {min_confidence:?}

# Units longer than this many bytes are split at an element, sentence or
# paragraph boundary
max_unit_len = {max_unit_len}

# Detect "8.1 Title" headers and end matter when a chapter has no
# <file>.markers.json sidecar
detect_sections = {detect_sections}

# Grow activities, examples, boxes and questions past their header line
grow_extents = {grow_extents}

# Curriculum context sent to the enrichment service
# subject = "science"
# grade = 8

# Batches with at least this many documents run in parallel
parallel_threshold = {parallel_threshold}

# Worker threads for parallel batches (0 = one per core)
worker_threads = {worker_threads}

[scoring]
# Completeness lost per sentence without terminal punctuation, as a fraction
truncation_penalty = {truncation_penalty:?}

# Coherence lost per repeated line
repeated_line_penalty = {repeated_line_penalty:?}

# Coherence lost when the text starts mid-sentence
broken_start_penalty = {broken_start_penalty:?}

# Coherence lost when elements appear out of order
order_penalty = {order_penalty:?}

# Share of good candidate terms that scores 1.0 for concept quality
good_concept_fraction = {good_concept_fraction:?}

# Activities, examples and questions that score 1.0 for application quality
application_target = {application_target}

# Weights for the aggregate score; without any the aggregate is a plain mean
[scoring.weights]
# completeness = 1.0
# coherence = 1.0
# concept_quality = 1.0
# application_quality = 1.0
# structural_completeness = 1.0
# readability = 1.0

[enrichment]
# Service receiving {{"text", "subject", "grade"}}; enrichment is off when unset
# endpoint = "http://localhost:8080/enrich"

# Per-request timeout in seconds
timeout_secs = {timeout_secs}

# Retries after a timeout, connection failure, 429 or 5xx
max_retries = {max_retries}

# Environment variable holding a bearer token
# token_env = "EDUCHUNK_ENRICH_TOKEN"

[output]
# text, json or markdown
default_format = "{default_format}"

# Show per-dimension scores and metadata in text output
include_metadata = {include_metadata}

# Indent JSON output
pretty_json = {pretty_json}

# Directory receiving one JSON record file per document
# store = "chunks"
"#,
        table = processing.table,
        min_confidence = processing.min_confidence,
        max_unit_len = processing.max_unit_len,
        detect_sections = processing.detect_sections,
        grow_extents = processing.grow_extents,
        parallel_threshold = processing.parallel_threshold,
        worker_threads = processing.worker_threads,
        truncation_penalty = scoring.truncation_penalty,
        repeated_line_penalty = scoring.repeated_line_penalty,
        broken_start_penalty = scoring.broken_start_penalty,
        order_penalty = scoring.order_penalty,
        good_concept_fraction = scoring.good_concept_fraction,
        application_target = scoring.application_target,
        timeout_secs = enrichment.timeout_secs,
        max_retries = enrichment.max_retries,
        default_format = output.default_format,
        include_metadata = output.include_metadata,
        pretty_json = output.pretty_json,
    )
}
