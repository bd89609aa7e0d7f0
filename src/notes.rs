//! Per-question notes — a small JSON-backed map keyed by question id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ExtractResult;

/// Disk-backed note map. Loaded once at construction; every mutation
/// rewrites the file via write-temp-then-rename so a crash never leaves a
/// truncated file or an unsaved note.
pub struct NoteStore {
    path: PathBuf,
    notes: HashMap<String, String>,
}

impl NoteStore {
    /// Open the store at `path`. A missing or corrupt file starts empty.
    pub fn open(path: &Path) -> Self {
        let notes = std::fs::read(path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            notes,
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&str> {
        self.notes.get(question_id).map(String::as_str)
    }

    /// Set or replace a note and persist immediately.
    /// A blank note removes the entry instead.
    pub fn set(&mut self, question_id: &str, note: &str) -> ExtractResult<()> {
        if note.trim().is_empty() {
            self.notes.remove(question_id);
        } else {
            self.notes.insert(question_id.to_string(), note.to_string());
        }
        self.flush()
    }

    /// Remove a note and persist immediately. Returns whether it existed.
    pub fn remove(&mut self, question_id: &str) -> ExtractResult<bool> {
        if self.notes.remove(question_id).is_none() {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    pub fn contains(&self, question_id: &str) -> bool {
        self.notes.contains_key(question_id)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Persist the map atomically. Called by every mutation.
    pub fn flush(&self) -> ExtractResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.notes)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), entries = self.notes.len(), "Notes flushed");
        Ok(())
    }
}
