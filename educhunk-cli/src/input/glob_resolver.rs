//! File pattern resolution using glob

use super::markers::MARKERS_SUFFIX;
use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

/// Resolve file patterns to the chapter files they name
///
/// Marker sidecars matched by a broad pattern are skipped.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let paths = glob(pattern).map_err(|_| CliError::InvalidPattern(pattern.clone()))?;

        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {}", pattern))?;

            let is_sidecar = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(MARKERS_SUFFIX));
            if path.is_file() && !is_sidecar {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        anyhow::bail!(CliError::FileNotFound(patterns.join(", ")));
    }

    files.sort();
    files.dedup();

    Ok(files)
}
