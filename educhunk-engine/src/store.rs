//! JSON chunk store
//!
//! One file per document under a root directory. A document's chunks are
//! written to a temporary file in the same directory and renamed into place,
//! so a reader sees either the previous set or the complete new one.

use crate::error::{EngineError, Result};
use crate::pipeline::{CancellationToken, DocumentOutput};
use educhunk_core::Chunk;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    document_id: String,
    chunks: Vec<Chunk>,
}

/// File-backed store of chunk records
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    root: PathBuf,
}

impl JsonRecordStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            EngineError::Store(format!("cannot create {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding a document's chunks
    pub fn path_for(&self, document_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.{EXTENSION}", file_stem(document_id)))
    }

    /// Write all chunks of a document, replacing any previous set
    ///
    /// Nothing is written when `token` is already cancelled.
    pub fn persist(&self, output: &DocumentOutput, token: &CancellationToken) -> Result<PathBuf> {
        token.check()?;

        let record = StoredDocument {
            document_id: output.document_id.clone(),
            chunks: output.chunks.clone(),
        };

        let temp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer_pretty(&mut writer, &record)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        token.check()?;
        let path = self.path_for(&output.document_id);
        temp.persist(&path)
            .map_err(|e| EngineError::Store(format!("cannot write {}: {}", path.display(), e.error)))?;

        log::debug!(
            "stored {} chunks of {} in {}",
            output.chunks.len(),
            output.document_id,
            path.display()
        );
        Ok(path)
    }

    /// Chunks of a stored document
    pub fn load(&self, document_id: &str) -> Result<Vec<Chunk>> {
        let path = self.path_for(document_id);
        let content = fs::read_to_string(&path).map_err(|e| {
            EngineError::Store(format!("cannot read {}: {e}", path.display()))
        })?;
        let record: StoredDocument = serde_json::from_str(&content)?;
        if record.document_id != document_id {
            return Err(EngineError::Store(format!(
                "{} holds document {}, not {}",
                path.display(),
                record.document_id,
                document_id
            )));
        }
        Ok(record.chunks)
    }

    /// Ids of all stored documents, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<StoredDocument>(&content) {
                Ok(record) => ids.push(record.document_id),
                Err(e) => log::warn!("skipping unreadable record {}: {}", path.display(), e),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete a stored document; returns whether it existed
    pub fn remove(&self, document_id: &str) -> Result<bool> {
        let path = self.path_for(document_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// File-system safe stem for a document id
///
/// Characters outside `[A-Za-z0-9.-]`, and a leading `.`, become `_`
/// followed by the hex of their UTF-8 bytes. Distinct ids get distinct stems.
fn file_stem(document_id: &str) -> String {
    let mut stem = String::with_capacity(document_id.len());
    for (i, c) in document_id.char_indices() {
        if c.is_ascii_alphanumeric() || c == '-' || (c == '.' && i > 0) {
            stem.push(c);
            continue;
        }
        let mut buf = [0u8; 4];
        for byte in c.encode_utf8(&mut buf).bytes() {
            stem.push_str(&format!("_{byte:02X}"));
        }
    }
    if stem.is_empty() {
        "_".to_string()
    } else {
        stem
    }
}
