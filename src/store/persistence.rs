//! Glossary persistence.
//!
//! # Responsibilities
//! - Load the glossary file at startup (best effort)
//! - Write the full glossary after every mutation, in mutation order
//!
//! # Design Decisions
//! - A single writer task drains an ordered channel, so the file always
//!   ends up holding the last submitted state
//! - Load failures fall back to an empty glossary
//! - Write failures end the writer task with an error; the server treats
//!   that as fatal

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::store::types::GlossaryEntry;

/// Errors from glossary persistence.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write glossary to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize glossary: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("glossary writer has stopped")]
    WriterStopped,
}

/// Read the glossary file, yielding an empty map if it is missing or bad.
pub fn load_glossary(path: &Path) -> BTreeMap<String, GlossaryEntry> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Glossary file unreadable, starting empty");
            return BTreeMap::new();
        }
    };

    match serde_json::from_str::<BTreeMap<String, GlossaryEntry>>(&content) {
        Ok(entries) => {
            tracing::info!(path = %path.display(), entries = entries.len(), "Loaded glossary");
            entries
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Glossary file invalid, starting empty");
            BTreeMap::new()
        }
    }
}

/// Handle to the background glossary writer.
#[derive(Debug, Clone)]
pub struct GlossaryWriter {
    tx: mpsc::UnboundedSender<String>,
}

/// The writer task; resolves with an error if a write failed.
pub type WriterTask = JoinHandle<Result<(), PersistenceError>>;

impl GlossaryWriter {
    /// Start the writer task for `path`. Must run inside a Tokio runtime.
    pub fn spawn(path: impl Into<PathBuf>) -> (Self, WriterTask) {
        let path = path.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let task = tokio::spawn(async move {
            while let Some(json) = rx.recv().await {
                tokio::fs::write(&path, json.as_bytes())
                    .await
                    .map_err(|source| {
                        tracing::error!(path = %path.display(), error = %source, "Glossary write failed");
                        PersistenceError::Write {
                            path: path.clone(),
                            source,
                        }
                    })?;
                tracing::debug!(path = %path.display(), bytes = json.len(), "Glossary written");
            }
            Ok(())
        });

        (Self { tx }, task)
    }

    /// Queue the full glossary for writing.
    pub fn submit(&self, entries: &BTreeMap<String, GlossaryEntry>) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(entries)?;
        self.tx.send(json).map_err(|_| PersistenceError::WriterStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pair: &str) -> GlossaryEntry {
        GlossaryEntry {
            word_pair: pair.into(),
            local: "l".into(),
            foreign: "f".into(),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_glossary(&dir.path().join("absent.json")).is_empty());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_glossary(&path).is_empty());
    }

    #[test]
    fn test_loads_object_keyed_by_word_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        std::fs::write(
            &path,
            r#"{"cat":{"wordPair":"cat","local":"cat","foreign":"gato"}}"#,
        )
        .unwrap();

        let entries = load_glossary(&path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries["cat"].foreign, "gato");
    }

    #[tokio::test]
    async fn test_writer_keeps_last_submission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        let (writer, task) = GlossaryWriter::spawn(&path);

        let mut entries = BTreeMap::new();
        entries.insert("a".to_string(), entry("a"));
        writer.submit(&entries).unwrap();
        entries.insert("b".to_string(), entry("b"));
        writer.submit(&entries).unwrap();

        drop(writer);
        task.await.unwrap().unwrap();

        assert_eq!(load_glossary(&path), entries);
    }

    #[tokio::test]
    async fn test_write_failure_ends_task() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("glossary.json");
        let (writer, task) = GlossaryWriter::spawn(&path);

        writer.submit(&BTreeMap::new()).unwrap();
        let result = task.await.unwrap();
        assert!(matches!(result, Err(PersistenceError::Write { .. })));

        assert!(matches!(
            writer.submit(&BTreeMap::new()),
            Err(PersistenceError::WriterStopped)
        ));
    }
}
