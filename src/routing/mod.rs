//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (ordered rule scan)
//!     → pattern.rs (anchored segment match, capture decoding)
//!     → Return: handler future, or NoMatch with the request
//!
//! Route Compilation (at startup):
//!     (method, "/talks/{title}", handler)
//!     → Compile template into literal/capture segments
//!     → Append to the rule list
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod pattern;
pub mod router;

pub use pattern::{Captures, InvalidCapture, PathPattern, PatternError};
pub use router::{Resolution, Router};
