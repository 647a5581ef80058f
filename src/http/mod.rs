//! HTTP endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → routes.rs (API routing table) → routing::Router::resolve
//!     → handlers/ (talks, glossary) using request.rs helpers
//!     → response.rs (status, headers, body envelope)
//!     → Send to client
//!
//! No route matched:
//!     → static files from the configured directory
//! ```

pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod routes;
pub mod server;

pub use error::{ApiError, ApiResult};
pub use response::ApiResponse;
pub use server::{AppState, HttpServer, ServerError};
