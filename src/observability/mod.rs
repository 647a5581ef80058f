//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log output (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (route, title, waiter id)
//! - Request ID flows through the tower-http layers
//! - Metrics are cheap (atomic increments); no-ops when no recorder is installed

pub mod logging;
pub mod metrics;
