//! The talks board: talks keyed by title plus a version counter.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::notify::{ChangeNotifier, PendingPoll};
use crate::observability::metrics;
use crate::store::types::{Comment, Talk, TalkProposal, TalkSnapshot};

/// Result of checking a client's known version against the board.
pub enum TalkPoll {
    /// The client is behind (or sent no tag): here is the current state.
    Current(TalkSnapshot),
    /// The client is current and did not ask to wait.
    NotModified,
    /// The client is current and is waiting for the next change.
    Waiting(PendingPoll<TalkSnapshot>),
}

#[derive(Default)]
struct BoardState {
    talks: BTreeMap<String, Talk>,
    version: u64,
}

impl BoardState {
    fn snapshot(&self) -> TalkSnapshot {
        TalkSnapshot {
            version: self.version,
            talks: self.talks.values().cloned().collect(),
        }
    }
}

/// Talks store with change notification.
///
/// The version check, waiter registration and every mutation share one
/// lock, so a change can never land between "tag matches" and "waiting".
pub struct TalkBoard {
    state: Mutex<BoardState>,
    notifier: Arc<ChangeNotifier<TalkSnapshot>>,
}

impl TalkBoard {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BoardState::default()),
            notifier: Arc::new(ChangeNotifier::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current version tag.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    pub fn snapshot(&self) -> TalkSnapshot {
        self.lock().snapshot()
    }

    pub fn get(&self, title: &str) -> Option<Talk> {
        self.lock().talks.get(title).cloned()
    }

    /// Create or replace a talk. Replacing resets its comments.
    pub fn put(&self, title: &str, proposal: TalkProposal) -> u64 {
        let mut state = self.lock();
        let replaced = state
            .talks
            .insert(title.to_string(), proposal.into_talk(title))
            .is_some();
        tracing::info!(title, replaced, "Talk stored");
        self.updated(&mut state)
    }

    /// Remove a talk. Returns the new version, or `None` if the title was
    /// absent (nothing changes and nobody is woken).
    pub fn delete(&self, title: &str) -> Option<u64> {
        let mut state = self.lock();
        state.talks.remove(title)?;
        tracing::info!(title, "Talk deleted");
        Some(self.updated(&mut state))
    }

    /// Append a comment. Returns the new version, or `None` if the talk
    /// does not exist.
    pub fn add_comment(&self, title: &str, comment: Comment) -> Option<u64> {
        let mut state = self.lock();
        let talk = state.talks.get_mut(title)?;
        talk.comments.push(comment);
        tracing::info!(title, comments = talk.comments.len(), "Comment added");
        Some(self.updated(&mut state))
    }

    /// Decide how to answer `GET /talks`.
    ///
    /// `known` is the client's `If-None-Match` version, `wait` its
    /// `Prefer: wait` hint.
    pub fn poll(&self, known: Option<u64>, wait: Option<Duration>) -> TalkPoll {
        let state = self.lock();
        if known != Some(state.version) {
            return TalkPoll::Current(state.snapshot());
        }
        match wait {
            None => TalkPoll::NotModified,
            Some(wait) => TalkPoll::Waiting(self.notifier.register(Instant::now() + wait)),
        }
    }

    /// Number of long polls currently waiting.
    pub fn pending_waiters(&self) -> usize {
        self.notifier.pending()
    }

    /// Release all waiting long polls with "not modified".
    pub fn release_waiters(&self) -> usize {
        self.notifier.close()
    }

    fn updated(&self, state: &mut BoardState) -> u64 {
        state.version += 1;
        let snapshot = state.snapshot();
        metrics::record_talks_version(state.version);
        let woken = self.notifier.resolve_all(&snapshot);
        tracing::debug!(version = state.version, woken, "Talks updated");
        state.version
    }
}

impl Default for TalkBoard {
    fn default() -> Self {
        Self::new()
    }
}
