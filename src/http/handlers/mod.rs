//! Route handlers for the talks and glossary resources.
//!
//! Every handler has the router's handler shape:
//! `(AppState, Captures, Request<Body>) -> ApiResult<ApiResponse>`.

pub mod glossary;
pub mod talks;

use crate::http::error::ApiError;
use crate::routing::Captures;

/// A capture the route template guarantees.
fn capture<'a>(captures: &'a Captures, name: &str) -> Result<&'a str, ApiError> {
    captures
        .get(name)
        .ok_or_else(|| ApiError::Internal(format!("route is missing capture '{name}'")))
}
