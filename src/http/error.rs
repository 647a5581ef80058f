//! Handler error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::routing::InvalidCapture;
use crate::store::PersistenceError;

/// Errors a route handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed JSON or missing/mis-typed fields. The store is untouched.
    #[error("{0}")]
    Validation(String),

    /// The target resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Anything unexpected.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InvalidCapture> for ApiError {
    fn from(err: InvalidCapture) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(format!("failed to encode response: {err}"))
    }
}

/// Result type for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Internal("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_persistence_failure_is_internal() {
        let err: ApiError = PersistenceError::WriterStopped.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "glossary writer has stopped");
    }
}
