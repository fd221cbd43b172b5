use super::library::PatternLibrary;
use crate::error::{CoreError, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static EMBEDDED_TABLES: OnceLock<std::result::Result<HashMap<String, Arc<PatternLibrary>>, CoreError>> =
    OnceLock::new();

/// Name of the table used when none is requested
pub const DEFAULT_TABLE: &str = "ncert";

macro_rules! embed_pattern_table {
    ($name:expr, $path:expr) => {
        ($name, include_str!($path))
    };
}

fn load_embedded_tables() -> Result<HashMap<String, Arc<PatternLibrary>>> {
    let mut tables = HashMap::new();

    let embedded = [embed_pattern_table!(
        "ncert",
        "../../configs/patterns/ncert.toml"
    )];

    for (name, toml_content) in embedded {
        let library = PatternLibrary::from_toml_str(toml_content).map_err(|e| {
            CoreError::Configuration(format!("embedded table {name}: {e}"))
        })?;

        // Validate that the table name matches
        if library.name() != name {
            return Err(CoreError::Configuration(format!(
                "table name mismatch: expected {}, got {}",
                name,
                library.name()
            )));
        }

        tables.insert(name.to_string(), Arc::new(library));
    }

    Ok(tables)
}

fn embedded_tables() -> Result<&'static HashMap<String, Arc<PatternLibrary>>> {
    EMBEDDED_TABLES
        .get_or_init(load_embedded_tables)
        .as_ref()
        .map_err(Clone::clone)
}

/// Get an embedded pattern table by name
pub fn get_pattern_table(name: &str) -> Result<Arc<PatternLibrary>> {
    embedded_tables()?
        .get(name)
        .cloned()
        .ok_or_else(|| CoreError::Configuration(format!("unknown pattern table: {name}")))
}

/// Names of the embedded pattern tables, sorted
pub fn list_pattern_tables() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = embedded_tables()
        .map(|tables| tables.keys().map(String::as_str).collect())
        .unwrap_or_default();
    names.sort_unstable();
    names
}

impl PatternLibrary {
    /// The default embedded table
    pub fn embedded() -> Result<Arc<PatternLibrary>> {
        get_pattern_table(DEFAULT_TABLE)
    }
}
