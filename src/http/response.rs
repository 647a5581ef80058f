//! Response envelope.
//!
//! # Responsibilities
//! - Carry status, body and headers from handlers to the wire
//! - Apply the default `Content-Type: text/plain` when a handler sets no headers
//! - Render handler errors as plain-text responses
//!
//! # Design Decisions
//! - Bodies are fully built strings; no streaming for API responses
//! - `ETag` is the talks version wrapped in double quotes

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, ETAG};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::store::TalkSnapshot;

const TEXT_PLAIN: &str = "text/plain";
const APPLICATION_JSON: &str = "application/json";

/// What a handler hands back to the endpoint layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
    /// `None` means "use the default headers".
    pub headers: Option<HeaderMap>,
}

impl Default for ApiResponse {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            body: String::new(),
            headers: None,
        }
    }
}

impl ApiResponse {
    /// A response with the given status and plain-text body.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: None,
        }
    }

    /// 200 with a JSON-encoded body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        Ok(Self {
            status: StatusCode::OK,
            body: serde_json::to_string(value)?,
            headers: Some(headers),
        })
    }

    pub fn no_content() -> Self {
        Self::text(StatusCode::NO_CONTENT, "")
    }

    pub fn not_modified() -> Self {
        Self::text(StatusCode::NOT_MODIFIED, "")
    }

    /// The talk list with its version as `ETag`.
    pub fn talks(snapshot: &TalkSnapshot) -> Result<Self, ApiError> {
        let mut response = Self::json(&*snapshot.talks)?;
        if let Some(headers) = response.headers.as_mut() {
            headers.insert(ETAG, etag(snapshot.version));
        }
        Ok(response)
    }

    /// Header value lookup, ignoring the defaults.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
    }
}

/// Format a version as an `ETag` value.
pub fn etag(version: u64) -> HeaderValue {
    // Digits and quotes are always valid header bytes.
    HeaderValue::from_str(&format!("\"{version}\"")).unwrap_or_else(|_| HeaderValue::from_static("\"0\""))
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        ApiResponse::text(err.status(), err.to_string())
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        match self.headers {
            Some(headers) => *response.headers_mut() = headers,
            None => {
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
            }
        }
        response
    }
}
