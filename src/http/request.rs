//! Request handling helpers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) for tracing
//! - Parse the long-poll headers (`If-None-Match`, `Prefer: wait=N`)
//! - Read and validate JSON bodies into typed values
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body validation happens before any store is touched
//! - "Invalid JSON" and "bad fields" are reported separately

use std::time::Duration;

use axum::body::Body;
use axum::http::header::IF_NONE_MATCH;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use serde::de::DeserializeOwned;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::error::ApiError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// RFC 7240 preference header.
pub const PREFER: HeaderName = HeaderName::from_static("prefer");

/// Generates a fresh UUID v4 for each request lacking an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of a request, or `"unknown"`.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// The version a client already has, from `If-None-Match: "<version>"`.
///
/// Takes everything between the first and last double quote. A tag that
/// is not a version number never matches.
pub fn known_version(headers: &HeaderMap) -> Option<u64> {
    let value = headers.get(IF_NONE_MATCH)?.to_str().ok()?;
    let start = value.find('"')?;
    let end = value.rfind('"')?;
    if end <= start {
        return None;
    }
    value[start + 1..end].parse().ok()
}

/// Seconds a client is willing to wait, from `Prefer: wait=<seconds>`.
pub fn wait_hint(headers: &HeaderMap) -> Option<u64> {
    headers
        .get_all(PREFER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(parse_wait)
}

fn parse_wait(prefer: &str) -> Option<u64> {
    let mut search_from = 0;
    while let Some(offset) = prefer[search_from..].find("wait=") {
        let at = search_from + offset;
        search_from = at + "wait=".len();

        // `wait` must start a word.
        let boundary = prefer[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '_'));
        if !boundary {
            continue;
        }

        let digits: &str = {
            let rest = &prefer[search_from..];
            let len = rest.bytes().take_while(u8::is_ascii_digit).count();
            &rest[..len]
        };
        if digits.is_empty() {
            continue;
        }
        // Absurdly long numbers saturate; the caller clamps anyway.
        return Some(digits.parse().unwrap_or(u64::MAX));
    }
    None
}

/// Clamp a wait hint to the configured ceiling.
pub fn clamp_wait(seconds: u64, max_wait_secs: u64) -> Duration {
    Duration::from_secs(seconds.min(max_wait_secs))
}

/// Read the whole body, up to `limit` bytes.
pub async fn read_body(request: Request<Body>, limit: usize) -> Result<Vec<u8>, ApiError> {
    axum::body::to_bytes(request.into_body(), limit)
        .await
        .map(|bytes| bytes.to_vec())
        .map_err(|e| ApiError::Validation(format!("Unreadable request body: {e}")))
}

/// Decode a JSON object body into `T`.
///
/// `what` names the payload in the error message ("talk", "comment", ...).
/// Fields are read by name only: arrays and scalars are rejected even when
/// they would fill the struct positionally.
pub fn decode_json<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Request body is not JSON");
        ApiError::Validation("Invalid JSON".to_string())
    })?;

    let bad_data = || ApiError::Validation(format!("Bad {what} data"));
    if !value.is_object() {
        tracing::debug!(what, "Request body is not a JSON object");
        return Err(bad_data());
    }
    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(what, error = %e, "Request body has missing or mistyped fields");
        bad_data()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Comment, GlossaryEntry, TalkProposal};

    fn headers(pairs: &[(HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_known_version() {
        assert_eq!(known_version(&headers(&[(IF_NONE_MATCH, "\"12\"")])), Some(12));
        assert_eq!(known_version(&headers(&[(IF_NONE_MATCH, "W/\"3\"")])), Some(3));
        assert_eq!(known_version(&headers(&[(IF_NONE_MATCH, "12")])), None);
        assert_eq!(known_version(&headers(&[(IF_NONE_MATCH, "\"abc\"")])), None);
        assert_eq!(known_version(&headers(&[(IF_NONE_MATCH, "\"")])), None);
        assert_eq!(known_version(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wait_hint() {
        assert_eq!(wait_hint(&headers(&[(PREFER, "wait=90")])), Some(90));
        assert_eq!(wait_hint(&headers(&[(PREFER, "respond-async, wait=5")])), Some(5));
        assert_eq!(wait_hint(&headers(&[(PREFER, "nowait=5")])), None);
        assert_eq!(wait_hint(&headers(&[(PREFER, "wait=soon")])), None);
        assert_eq!(wait_hint(&headers(&[(PREFER, "wait=0")])), Some(0));
        assert_eq!(
            wait_hint(&headers(&[(PREFER, "return=minimal"), (PREFER, "wait=7")])),
            Some(7)
        );
        assert_eq!(wait_hint(&HeaderMap::new()), None);
    }

    #[test]
    fn test_wait_hint_skips_non_word_start() {
        assert_eq!(wait_hint(&headers(&[(PREFER, "await=3; wait=4")])), Some(4));
    }

    #[test]
    fn test_clamp_wait() {
        assert_eq!(clamp_wait(10, 90), Duration::from_secs(10));
        assert_eq!(clamp_wait(u64::MAX, 90), Duration::from_secs(90));
    }

    #[test]
    fn test_decode_json_distinguishes_failures() {
        let ok: TalkProposal = decode_json(br#"{"presenter":"A","summary":"B"}"#, "talk").unwrap();
        assert_eq!(ok.presenter, "A");

        let err = decode_json::<TalkProposal>(b"{oops", "talk").unwrap_err();
        assert_eq!(err.to_string(), "Invalid JSON");

        let err = decode_json::<Comment>(br#"{"author":"A"}"#, "comment").unwrap_err();
        assert_eq!(err.to_string(), "Bad comment data");

        let err = decode_json::<Comment>(b"null", "comment").unwrap_err();
        assert_eq!(err.to_string(), "Bad comment data");
    }

    #[test]
    fn test_decode_json_rejects_positional_arrays() {
        let err = decode_json::<TalkProposal>(br#"["A","B"]"#, "talk").unwrap_err();
        assert_eq!(err.to_string(), "Bad talk data");

        let err = decode_json::<Comment>(br#"["X","Y"]"#, "comment").unwrap_err();
        assert_eq!(err.to_string(), "Bad comment data");

        let err = decode_json::<GlossaryEntry>(br#"["p","l","f"]"#, "word").unwrap_err();
        assert_eq!(err.to_string(), "Bad word data");

        let err = decode_json::<Comment>(br#""text""#, "comment").unwrap_err();
        assert_eq!(err.to_string(), "Bad comment data");
    }

    #[tokio::test]
    async fn test_read_body_respects_limit() {
        let request = Request::builder().body(Body::from("0123456789")).unwrap();
        assert!(read_body(request, 4).await.is_err());

        let request = Request::builder().body(Body::from("0123")).unwrap();
        assert_eq!(read_body(request, 4).await.unwrap(), b"0123");
    }
}
