//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → HttpServer::run sees it → release long polls
//!     → stop accepting → drain connections → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → same path as trigger()
//! ```
//!
//! # Design Decisions
//! - Shutdown has a grace period: forced exit after the deadline
//! - Waiting long polls are answered "not modified" before draining

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
