//! Resource stores.
//!
//! # Data Flow
//! ```text
//! PUT/DELETE/POST handler
//!     → talks.rs (mutate, bump version, wake long polls)
//!     → glossary.rs (mutate, hand full map to persistence.rs)
//!
//! Startup:
//!     persistence.rs load_glossary() → Glossary
//! ```
//!
//! # Design Decisions
//! - Talks and glossary are independent and never share a lock
//! - Values are replaced whole; only comments are appended in place
//! - Keys are exact strings; listing order is key order

pub mod glossary;
pub mod persistence;
pub mod talks;
pub mod types;

pub use glossary::Glossary;
pub use persistence::{load_glossary, GlossaryWriter, PersistenceError, WriterTask};
pub use talks::{TalkBoard, TalkPoll};
pub use types::{Comment, GlossaryEntry, Talk, TalkProposal, TalkSnapshot};
