//! Long-poll waiter registry.
//!
//! # State Transitions
//! ```text
//! register → Waiting
//! Waiting → Changed:     resolve_all() after a mutation
//! Waiting → NotModified: the waiter's own deadline fires
//! Waiting → NotModified: close() during shutdown
//! Waiting → (removed):   the client went away (PendingPoll dropped)
//! ```
//!
//! # Design Decisions
//! - One mutex guards the waiter map; every settle happens under it
//! - Each waiter has its own timer task and cancellation token
//! - Settling aborts the timer; a timer that already woke checks the
//!   token and returns without touching the map

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::notify::waiter::{WaiterId, WaiterToken};
use crate::observability::metrics;

/// How a long poll ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// A mutation happened; carries the fresh snapshot.
    Changed(T),
    /// The deadline passed (or the server is closing) with no change.
    NotModified,
}

struct Waiter<T> {
    token: WaiterToken,
    tx: oneshot::Sender<PollOutcome<T>>,
    timer: AbortHandle,
}

/// Holds pending long polls and wakes them.
pub struct ChangeNotifier<T> {
    waiters: Mutex<HashMap<WaiterId, Waiter<T>>>,
}

impl<T> ChangeNotifier<T>
where
    T: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            waiters: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WaiterId, Waiter<T>>> {
        self.waiters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a waiter that gives up at `deadline`.
    ///
    /// Must be called from within a Tokio runtime; the timeout runs as its
    /// own task.
    pub fn register(self: &Arc<Self>, deadline: Instant) -> PendingPoll<T> {
        let id = WaiterId::new();
        let token = WaiterToken::new();
        let (tx, rx) = oneshot::channel();

        let mut waiters = self.lock();

        // The timer cannot touch the map before we release the lock.
        let notifier = Arc::clone(self);
        let timer_token = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            notifier.expire(id, &timer_token);
        })
        .abort_handle();

        waiters.insert(
            id,
            Waiter {
                token: token.clone(),
                tx,
                timer,
            },
        );
        metrics::record_pending_waiters(waiters.len());
        tracing::debug!(
            waiter = %id,
            pending = waiters.len(),
            wait_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
            "Long poll waiting"
        );

        PendingPoll {
            id,
            token,
            rx,
            notifier: Arc::clone(self),
        }
    }

    /// Resolve every current waiter with `snapshot` and clear the set.
    /// Returns how many waiters were woken.
    pub fn resolve_all(&self, snapshot: &T) -> usize {
        let mut waiters = self.lock();
        let mut woken = 0;
        for (id, waiter) in waiters.drain() {
            if !waiter.token.settle() {
                continue;
            }
            waiter.timer.abort();
            if waiter.tx.send(PollOutcome::Changed(snapshot.clone())).is_ok() {
                woken += 1;
            } else {
                tracing::trace!(waiter = %id, "Waiter gone before change delivered");
            }
        }
        metrics::record_pending_waiters(0);
        if woken > 0 {
            metrics::record_waiters_resolved("changed", woken);
            tracing::debug!(woken, "Long polls resolved with new snapshot");
        }
        woken
    }

    /// Release every waiter with "not modified". Used at shutdown.
    pub fn close(&self) -> usize {
        let mut waiters = self.lock();
        let mut released = 0;
        for (_, waiter) in waiters.drain() {
            if waiter.token.settle() {
                waiter.timer.abort();
                let _ = waiter.tx.send(PollOutcome::NotModified);
                released += 1;
            }
        }
        metrics::record_pending_waiters(0);
        if released > 0 {
            metrics::record_waiters_resolved("closed", released);
            tracing::info!(released, "Released pending long polls");
        }
        released
    }

    /// Number of waiters currently registered.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    fn expire(&self, id: WaiterId, token: &WaiterToken) {
        if token.is_settled() {
            return;
        }
        let mut waiters = self.lock();
        let Some(waiter) = waiters.remove(&id) else {
            return;
        };
        metrics::record_pending_waiters(waiters.len());
        if waiter.token.settle() {
            let _ = waiter.tx.send(PollOutcome::NotModified);
            metrics::record_waiters_resolved("timeout", 1);
            tracing::debug!(waiter = %id, "Long poll timed out");
        }
    }

    fn abandon(&self, id: WaiterId) {
        let mut waiters = self.lock();
        if let Some(waiter) = waiters.remove(&id) {
            waiter.token.settle();
            waiter.timer.abort();
            metrics::record_pending_waiters(waiters.len());
            metrics::record_waiters_resolved("abandoned", 1);
            tracing::debug!(waiter = %id, "Long poll abandoned by client");
        }
    }
}

impl<T> Default for ChangeNotifier<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for one registered long poll.
///
/// Dropping it before it resolves removes the waiter immediately.
pub struct PendingPoll<T>
where
    T: Clone + Send + 'static,
{
    id: WaiterId,
    token: WaiterToken,
    rx: oneshot::Receiver<PollOutcome<T>>,
    notifier: Arc<ChangeNotifier<T>>,
}

impl<T> PendingPoll<T>
where
    T: Clone + Send + 'static,
{
    pub fn id(&self) -> WaiterId {
        self.id
    }

    /// Wait for the mutation or the deadline, whichever comes first.
    pub async fn outcome(mut self) -> PollOutcome<T> {
        (&mut self.rx).await.unwrap_or(PollOutcome::NotModified)
    }
}

impl<T> Drop for PendingPoll<T>
where
    T: Clone + Send + 'static,
{
    fn drop(&mut self) {
        if !self.token.is_settled() {
            self.notifier.abandon(self.id);
        }
    }
}
