//! Section marker sidecars
//!
//! A chapter file `ch8.txt` may come with `ch8.txt.markers.json`, a JSON
//! array of `{"offset": <byte>, "label": "<text>"}` objects produced by the
//! text extraction step.

use crate::error::CliError;
use anyhow::{Context, Result};
use educhunk_core::SectionMarker;
use std::fs;
use std::path::{Path, PathBuf};

/// File name suffix of a marker sidecar
pub const MARKERS_SUFFIX: &str = ".markers.json";

/// Sidecar path for a chapter file
pub fn markers_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(MARKERS_SUFFIX);
    PathBuf::from(name)
}

/// Markers for a chapter file, if it has a sidecar
pub fn load_markers(path: &Path) -> Result<Option<Vec<SectionMarker>>> {
    let sidecar = markers_path(path);
    if !sidecar.is_file() {
        return Ok(None);
    }

    let content = fs::read_to_string(&sidecar)
        .with_context(|| format!("Failed to read markers: {}", sidecar.display()))?;
    let markers: Vec<SectionMarker> = serde_json::from_str(&content)
        .map_err(|e| CliError::MarkersError(format!("{}: {e}", sidecar.display())))?;

    log::debug!("{} markers from {}", markers.len(), sidecar.display());
    Ok(Some(markers))
}
