//! Change notification subsystem (long polling).
//!
//! # Data Flow
//! ```text
//! GET /talks with current ETag + Prefer: wait=N
//!     → notifier.rs register() → PendingPoll (timer task armed)
//!
//! Talk mutation:
//!     → notifier.rs resolve_all(snapshot)
//!     → every PendingPoll completes with Changed(snapshot)
//!
//! Deadline:
//!     → timer task → expire() → that PendingPoll completes NotModified
//! ```
//!
//! # Design Decisions
//! - The waiter set is owned by the notifier; nothing else mutates it
//! - Exactly-once resolution through a per-waiter token (waiter.rs)
//! - Abandoned polls are removed as soon as their handle is dropped

pub mod notifier;
pub mod waiter;

pub use notifier::{ChangeNotifier, PendingPoll, PollOutcome};
pub use waiter::{WaiterId, WaiterToken};
