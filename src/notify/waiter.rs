//! Waiter identity and settlement token.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static WAITER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a pending long poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaiterId(u64);

impl WaiterId {
    pub fn new() -> Self {
        Self(WAITER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for WaiterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WaiterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "waiter-{}", self.0)
    }
}

/// Per-waiter cancellation token.
///
/// Settled exactly once, by whichever of mutation, timeout or abandonment
/// gets there first. Everyone else sees it settled and backs off.
#[derive(Debug, Clone, Default)]
pub struct WaiterToken {
    settled: Arc<AtomicBool>,
}

impl WaiterToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the right to resolve. Returns false if already settled.
    pub fn settle(&self) -> bool {
        self.settled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_settled(&self) -> bool {
        self.settled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiter_id_unique() {
        assert_ne!(WaiterId::new(), WaiterId::new());
    }

    #[test]
    fn token_settles_once_across_clones() {
        let token = WaiterToken::new();
        let timer_copy = token.clone();
        assert!(!timer_copy.is_settled());

        assert!(token.settle());
        assert!(timer_copy.is_settled());
        assert!(!timer_copy.settle());
    }
}
