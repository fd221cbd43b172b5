//! Declarative pattern tables
//!
//! Detection rules live in TOML tables, one tagged record per rule. Adding a
//! curriculum or a language means adding rules to a table; the detector has
//! no per-category branches.

pub(crate) mod config;
mod library;
mod loader;

pub use config::{PatternTableConfig, RuleConfig, TableMetadata};
pub use library::{ExampleFailure, PatternLibrary, Rule, ANY_LANGUAGE};
pub use loader::{get_pattern_table, list_pattern_tables, DEFAULT_TABLE};
