//! Validate command implementation

use anyhow::{Context, Result};
use clap::Args;
use educhunk_core::{get_pattern_table, PatternLibrary, DEFAULT_TABLE};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Pattern table file to validate (default: the embedded table)
    #[arg(short, long, value_name = "FILE", conflicts_with = "table")]
    pub patterns: Option<PathBuf>,

    /// Embedded pattern table to validate
    #[arg(short, long, value_name = "NAME")]
    pub table: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        let library = self.load()?;

        println!("Validating pattern table: {}", library.name());
        let failures = library.validate_examples();
        if failures.is_empty() {
            println!("✓ Pattern table is valid!");
            println!("  Rules: {}", library.len());
            return Ok(());
        }

        println!("✗ {} rule examples do not match!", failures.len());
        for failure in &failures {
            println!("  {}: {:?}", failure.rule_id, failure.example);
        }
        Err(anyhow::anyhow!(
            "Validation failed: {} rule examples do not match",
            failures.len()
        ))
    }

    fn load(&self) -> Result<Arc<PatternLibrary>> {
        if let Some(path) = &self.patterns {
            let library = PatternLibrary::from_file(path)
                .with_context(|| format!("Failed to load pattern table: {}", path.display()))?;
            return Ok(Arc::new(library));
        }
        let name = self.table.as_deref().unwrap_or(DEFAULT_TABLE);
        get_pattern_table(name).with_context(|| format!("Failed to load pattern table: {name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn table_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", content).unwrap();
        temp_file
    }

    #[test]
    fn test_validate_args_debug() {
        let args = ValidateArgs {
            patterns: Some(PathBuf::from("patterns.toml")),
            table: None,
        };

        let debug_str = format!("{:?}", args);
        assert!(debug_str.contains("ValidateArgs"));
        assert!(debug_str.contains("patterns.toml"));
    }

    #[test]
    fn test_validate_embedded_table() {
        let args = ValidateArgs {
            patterns: None,
            table: None,
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_validate_valid_file() {
        let file = table_file(
            r#"
[metadata]
name = "custom"

[[rules]]
id = "activity.numbered"
category = "activity"
pattern = 'Activity \d+\.\d+'
examples = ["Activity 8.1"]
"#,
        );
        let args = ValidateArgs {
            patterns: Some(file.path().to_path_buf()),
            table: None,
        };
        assert!(args.execute().is_ok());
    }

    #[test]
    fn test_validate_failing_example() {
        let file = table_file(
            r#"
[metadata]
name = "custom"

[[rules]]
id = "example.numbered"
category = "example"
pattern = 'Example \d+'
examples = ["Example 2", "Illustration 3"]
"#,
        );
        let args = ValidateArgs {
            patterns: Some(file.path().to_path_buf()),
            table: None,
        };
        assert!(args.execute().is_err());
    }

    #[test]
    fn test_validate_unknown_table() {
        let args = ValidateArgs {
            patterns: None,
            table: Some("cbse".to_string()),
        };
        assert!(args.execute().is_err());
    }

    #[test]
    fn test_validate_malformed_pattern() {
        let file = table_file(
            r#"
[metadata]
name = "broken"

[[rules]]
id = "bad"
category = "activity"
pattern = '(unclosed'
"#,
        );
        let args = ValidateArgs {
            patterns: Some(file.path().to_path_buf()),
            table: None,
        };
        assert!(args.execute().is_err());
    }
}
