//! File reading utilities

use anyhow::{Context, Result};
use educhunk_core::SourceDocument;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads chapter files into source documents
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(content)
    }

    /// Document id for a file: its name without the extension
    pub fn document_id(path: &Path) -> String {
        path.file_stem()
            .or_else(|| path.file_name())
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Unique document ids for a batch of files, in input order
    ///
    /// Files sharing a stem are qualified with their parent directory
    /// (`a/ch8`), and get their full path if that still collides.
    pub fn document_ids(paths: &[PathBuf]) -> Vec<String> {
        let stems: Vec<String> = paths.iter().map(|p| Self::document_id(p)).collect();
        let stem_counts = occurrences(&stems);

        let qualified: Vec<String> = paths
            .iter()
            .zip(&stems)
            .map(|(path, stem)| {
                if stem_counts[stem.as_str()] == 1 {
                    return stem.clone();
                }
                match path.parent().and_then(Path::file_name) {
                    Some(parent) => format!("{}/{stem}", parent.to_string_lossy()),
                    None => stem.clone(),
                }
            })
            .collect();
        let qualified_counts = occurrences(&qualified);

        paths
            .iter()
            .zip(&qualified)
            .map(|(path, id)| {
                let id = if qualified_counts[id.as_str()] == 1 {
                    id.clone()
                } else {
                    path.display().to_string()
                };
                if stem_counts[Self::document_id(path).as_str()] > 1 {
                    log::warn!(
                        "{} shares its file name with another input; using id {id}",
                        path.display()
                    );
                }
                id
            })
            .collect()
    }

    /// Read a file as a source document with optional curriculum context
    pub fn read_document(
        path: &Path,
        id: String,
        subject: Option<&str>,
        grade: Option<u8>,
    ) -> Result<SourceDocument> {
        let mut document = SourceDocument::new(id, Self::read_text(path)?);
        document.subject = subject.map(str::to_string);
        document.grade = grade;
        Ok(document)
    }
}

fn occurrences(ids: &[String]) -> HashMap<&str, usize> {
    let mut counts = HashMap::new();
    for id in ids {
        *counts.entry(id.as_str()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_read_text_success() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("chapter.txt");

        let content = "8.1 Force\nA push or a pull.";
        fs::write(&file_path, content).unwrap();

        assert_eq!(FileReader::read_text(&file_path).unwrap(), content);
    }

    #[test]
    fn test_read_text_nonexistent_file() {
        let result = FileReader::read_text(Path::new("/nonexistent/file.txt"));
        let err_msg = result.unwrap_err().to_string();
        assert!(err_msg.contains("Failed to read file"));
    }

    #[test]
    fn test_read_text_devanagari() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("hindi.txt");

        let content = "गतिविधि 3.1 एक गेंद को धक्का दीजिए।";
        fs::write(&file_path, content).unwrap();

        assert_eq!(FileReader::read_text(&file_path).unwrap(), content);
    }

    #[test]
    fn test_read_text_rejects_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("binary.txt");
        fs::write(&file_path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(FileReader::read_text(&file_path).is_err());
    }

    #[test]
    fn test_document_id() {
        assert_eq!(
            FileReader::document_id(&PathBuf::from("books/science-8-ch8.txt")),
            "science-8-ch8"
        );
        assert_eq!(FileReader::document_id(&PathBuf::from("notes")), "notes");
    }

    #[test]
    fn test_document_ids_are_unique_within_a_batch() {
        let paths: Vec<PathBuf> = [
            "physics/ch8.txt",
            "chemistry/ch8.txt",
            "ch9.txt",
            "x/shared/ch10.txt",
            "y/shared/ch10.txt",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let ids = FileReader::document_ids(&paths);
        assert_eq!(
            ids,
            [
                "physics/ch8",
                "chemistry/ch8",
                "ch9",
                "x/shared/ch10.txt",
                "y/shared/ch10.txt"
            ]
        );
    }

    #[test]
    fn test_document_ids_keep_plain_stems_without_collisions() {
        let paths = vec![PathBuf::from("a/ch8.txt"), PathBuf::from("b/ch9.txt")];
        assert_eq!(FileReader::document_ids(&paths), ["ch8", "ch9"]);
    }

    #[test]
    fn test_read_document_with_context() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("ch8.txt");
        fs::write(&file_path, "Force is a push.").unwrap();

        let id = FileReader::document_id(&file_path);
        let document = FileReader::read_document(&file_path, id, Some("science"), Some(8)).unwrap();
        assert_eq!(document.id, "ch8");
        assert_eq!(document.subject.as_deref(), Some("science"));
        assert_eq!(document.grade, Some(8));
    }
}
