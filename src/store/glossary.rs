//! Glossary store: entries keyed by word pair, persisted on every change.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::observability::metrics;
use crate::store::persistence::{GlossaryWriter, PersistenceError};
use crate::store::types::GlossaryEntry;

/// Thread-safe glossary with optional write-through persistence.
pub struct Glossary {
    entries: Mutex<BTreeMap<String, GlossaryEntry>>,
    writer: Option<GlossaryWriter>,
}

impl Glossary {
    pub fn new(entries: BTreeMap<String, GlossaryEntry>, writer: Option<GlossaryWriter>) -> Self {
        metrics::record_glossary_size(entries.len());
        Self {
            entries: Mutex::new(entries),
            writer,
        }
    }

    /// An empty glossary that is never written to disk.
    pub fn in_memory() -> Self {
        Self::new(BTreeMap::new(), None)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, GlossaryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, word_pair: &str) -> Option<GlossaryEntry> {
        self.lock().get(word_pair).cloned()
    }

    /// All entries, ordered by key.
    pub fn entries(&self) -> Vec<GlossaryEntry> {
        self.lock().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Create or replace the entry under `word_pair`; returns the refreshed
    /// collection.
    ///
    /// The new state is handed to the writer before it becomes visible, so
    /// a failed hand-off leaves the glossary unchanged.
    pub fn put(&self, word_pair: &str, entry: GlossaryEntry) -> Result<Vec<GlossaryEntry>, PersistenceError> {
        let mut entries = self.lock();
        let mut next = entries.clone();
        next.insert(word_pair.to_string(), entry);
        self.updated(&next)?;
        *entries = next;
        tracing::info!(word_pair, entries = entries.len(), "Glossary entry stored");
        Ok(entries.values().cloned().collect())
    }

    /// Remove the entry if present; absent keys are a no-op. Returns the
    /// refreshed collection.
    pub fn delete(&self, word_pair: &str) -> Result<Vec<GlossaryEntry>, PersistenceError> {
        let mut entries = self.lock();
        if entries.contains_key(word_pair) {
            let mut next = entries.clone();
            next.remove(word_pair);
            self.updated(&next)?;
            *entries = next;
            tracing::info!(word_pair, entries = entries.len(), "Glossary entry deleted");
        }
        Ok(entries.values().cloned().collect())
    }

    // Called with the lock held so writes reach the writer in mutation order.
    fn updated(&self, entries: &BTreeMap<String, GlossaryEntry>) -> Result<(), PersistenceError> {
        if let Some(writer) = &self.writer {
            writer.submit(entries)?;
        }
        metrics::record_glossary_size(entries.len());
        Ok(())
    }
}
