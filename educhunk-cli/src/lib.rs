//! educhunk CLI library
//!
//! Command-line interface for chunking NCERT textbook chapters into
//! scored learning units.

pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod progress;

pub use error::{CliError, CliResult};
