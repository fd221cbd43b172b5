//! Input handling module

pub mod file_reader;
pub mod glob_resolver;
pub mod markers;

pub use file_reader::FileReader;
pub use glob_resolver::resolve_patterns;
pub use markers::{load_markers, markers_path, MARKERS_SUFFIX};
