//! Skill-sharing talk board server library.
//!
//! Talks and a glossary served over HTTP, with long polling on `/talks`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod notify;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
