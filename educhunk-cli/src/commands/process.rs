//! Process command implementation

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::input::{load_markers, resolve_patterns, FileReader};
use crate::output::{JsonFormatter, MarkdownFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use educhunk_engine::{
    run_batch, CancellationToken, ChunkPipeline, DocumentJob, EnrichmentConfig, ExecutionMode,
    JsonRecordStore, PipelineConfig,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Arguments for the process command
#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Embedded pattern table
    #[arg(short, long, value_name = "NAME")]
    pub table: Option<String>,

    /// Keep only rules for this language (en, hi)
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Drop detections below this confidence
    #[arg(long, value_name = "0..1")]
    pub min_confidence: Option<f64>,

    /// Split units longer than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_unit_len: Option<usize>,

    /// Do not detect section headers when a file has no marker sidecar
    #[arg(long)]
    pub no_sections: bool,

    /// Grow activities, examples and boxes past their header line
    #[arg(long)]
    pub grow_extents: bool,

    /// Subject passed to enrichment
    #[arg(long)]
    pub subject: Option<String>,

    /// Grade passed to enrichment
    #[arg(long)]
    pub grade: Option<u8>,

    /// Enrichment service endpoint
    #[arg(long, value_name = "URL", env = "EDUCHUNK_ENRICH_ENDPOINT")]
    pub enrich_endpoint: Option<String>,

    /// Write chunk records to this directory
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Include scores and metadata in text output
    #[arg(short, long)]
    pub metadata: bool,

    /// Force parallel processing even for small batches
    #[arg(short, long, conflicts_with = "sequential")]
    pub parallel: bool,

    /// Force sequential processing
    #[arg(long)]
    pub sequential: bool,

    /// Number of worker threads for parallel processing
    #[arg(long, value_name = "COUNT")]
    pub threads: Option<usize>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per chunk with its quality
    Text,
    /// JSON array of documents with full chunk records
    Json,
    /// Markdown section per chunk
    Markdown,
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self) -> Result<()> {
        self.init_logging()?;

        log::info!("Starting chunking");
        log::debug!("Arguments: {:?}", self);

        let file_config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let config = self.pipeline_config(&file_config)?;
        let format = self.output_format(&file_config)?;
        let pipeline = ChunkPipeline::with_config(config).context("Failed to build pipeline")?;

        let files = resolve_patterns(&self.input)?;
        log::info!("Found {} files to process", files.len());

        let subject = self
            .subject
            .as_deref()
            .or(file_config.processing.subject.as_deref());
        let grade = self.grade.or(file_config.processing.grade);

        let ids = FileReader::document_ids(&files);
        let mut jobs = Vec::with_capacity(files.len());
        for (path, id) in files.iter().zip(ids) {
            let document = FileReader::read_document(path, id, subject, grade)?;
            let mut job = DocumentJob::new(document);
            if let Some(markers) = load_markers(path)? {
                job = job.with_markers(markers);
            }
            jobs.push(job);
        }

        let store = match self.store.as_ref().or(file_config.output.store.as_ref()) {
            Some(dir) => Some(
                JsonRecordStore::open(dir)
                    .with_context(|| format!("Failed to open store: {}", dir.display()))?,
            ),
            None => None,
        };

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(jobs.len() as u64);
        progress.set_stage("chunking");

        let token = CancellationToken::new();
        let outcomes = run_batch(&pipeline, &jobs, &token)?;

        let mut formatter = self.formatter(format, &file_config)?;
        let mut failed = 0;
        for outcome in &outcomes {
            match &outcome.result {
                Ok(output) => {
                    if let Some(store) = &store {
                        store.persist(output, &token).with_context(|| {
                            format!("Failed to store chunks of {}", output.document_id)
                        })?;
                    }
                    formatter.format_document(output)?;
                }
                Err(e) => {
                    failed += 1;
                    log::error!("{}: {}", outcome.document_id, e);
                }
            }
            progress.document_completed(&outcome.document_id);
        }
        formatter.finish()?;
        progress.finish();

        if failed > 0 {
            return Err(CliError::DocumentsFailed {
                failed,
                total: outcomes.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Merge the configuration file with command-line overrides
    fn pipeline_config(&self, file_config: &CliConfig) -> CliResult<PipelineConfig> {
        let mut config = file_config.to_pipeline_config()?;

        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if let Some(language) = &self.language {
            config.language = Some(language.clone());
        }
        if let Some(value) = self.min_confidence {
            config.detector.min_confidence = value;
        }
        if let Some(bytes) = self.max_unit_len {
            config.resolver.max_unit_len = bytes;
        }
        if self.no_sections {
            config.detect_sections = false;
        }
        if self.grow_extents {
            config.detector.extents.get_or_insert_with(Default::default);
        }
        if let Some(endpoint) = &self.enrich_endpoint {
            config.enrichment = EnrichmentConfig {
                endpoint: Some(endpoint.clone()),
                enabled: true,
                ..file_config.enrichment.to_enrichment_config()
            };
        }
        if self.parallel {
            config.execution_mode = Some(ExecutionMode::Parallel);
        } else if self.sequential {
            config.execution_mode = Some(ExecutionMode::Sequential);
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }

        config
            .validate()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
        Ok(config)
    }

    fn output_format(&self, file_config: &CliConfig) -> CliResult<OutputFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        let name = &file_config.output.default_format;
        OutputFormat::from_str(name, true).map_err(|_| {
            CliError::ConfigError(format!("unknown output format: {name}")).into()
        })
    }

    fn formatter(
        &self,
        format: OutputFormat,
        file_config: &CliConfig,
    ) -> CliResult<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };

        let include_metadata = self.metadata || file_config.output.include_metadata;
        Ok(match format {
            OutputFormat::Text => Box::new(TextFormatter::new(writer, include_metadata)),
            OutputFormat::Json => {
                Box::new(JsonFormatter::new(writer, file_config.output.pretty_json))
            }
            OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer)),
        })
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) -> Result<()> {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            // A logger may already be installed when commands run in-process
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ProcessArgs,
    }

    fn parse(args: &[&str]) -> ProcessArgs {
        let mut argv = vec!["educhunk"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().args
    }

    #[test]
    fn test_input_is_required() {
        assert!(TestCli::try_parse_from(["educhunk"]).is_err());
    }

    #[test]
    fn test_parallel_conflicts_with_sequential() {
        assert!(TestCli::try_parse_from(["educhunk", "-i", "a.txt", "-p", "--sequential"]).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let args = parse(&[
            "-i",
            "ch8.txt",
            "--language",
            "hi",
            "--max-unit-len",
            "900",
            "--no-sections",
            "--grow-extents",
            "--sequential",
        ]);
        let config = args.pipeline_config(&CliConfig::default()).unwrap();
        assert_eq!(config.language.as_deref(), Some("hi"));
        assert_eq!(config.resolver.max_unit_len, 900);
        assert!(!config.detect_sections);
        assert!(config.detector.extents.is_some());
        assert_eq!(config.execution_mode, Some(ExecutionMode::Sequential));
    }

    #[test]
    fn test_enrich_endpoint_keeps_file_timeout() {
        let file_config =
            CliConfig::from_toml_str("[enrichment]\ntimeout_secs = 7\n").unwrap();
        let args = parse(&["-i", "ch8.txt", "--enrich-endpoint", "http://localhost:9/enrich"]);
        let config = args.pipeline_config(&file_config).unwrap();
        assert!(config.enrichment.enabled);
        assert_eq!(config.enrichment.timeout.as_secs(), 7);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = parse(&["-i", "ch8.txt", "--min-confidence", "3"]);
        assert!(args.pipeline_config(&CliConfig::default()).is_err());
    }

    #[test]
    fn test_output_format_from_config() {
        let args = parse(&["-i", "ch8.txt"]);
        let file_config =
            CliConfig::from_toml_str("[output]\ndefault_format = \"markdown\"\n").unwrap();
        assert_eq!(
            args.output_format(&file_config).unwrap(),
            OutputFormat::Markdown
        );

        let bad = CliConfig::from_toml_str("[output]\ndefault_format = \"xml\"\n").unwrap();
        assert!(args.output_format(&bad).is_err());

        let explicit = parse(&["-i", "ch8.txt", "-f", "json"]);
        assert_eq!(explicit.output_format(&bad).unwrap(), OutputFormat::Json);
    }
}
