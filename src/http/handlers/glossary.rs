//! `/glossary` handlers. Mutations answer with the whole collection.

use axum::body::Body;
use axum::http::Request;

use crate::http::error::{ApiError, ApiResult};
use crate::http::handlers::capture;
use crate::http::request::{decode_json, read_body};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routing::Captures;
use crate::store::GlossaryEntry;

/// `GET /glossary`
pub async fn list_words(state: AppState, _captures: Captures, _request: Request<Body>) -> ApiResult<ApiResponse> {
    ApiResponse::json(&state.glossary.entries())
}

/// `GET /glossary/{word}`
pub async fn get_word(state: AppState, captures: Captures, _request: Request<Body>) -> ApiResult<ApiResponse> {
    let word = capture(&captures, "word")?;
    match state.glossary.get(word) {
        Some(entry) => ApiResponse::json(&entry),
        None => Err(ApiError::NotFound(format!("No word '{word}' found"))),
    }
}

/// `PUT /glossary/{wordPair}`: stored under the path key.
pub async fn put_word(state: AppState, captures: Captures, request: Request<Body>) -> ApiResult<ApiResponse> {
    let word_pair = capture(&captures, "wordPair")?;
    let body = read_body(request, state.max_body_bytes).await?;
    let entry: GlossaryEntry = decode_json(&body, "word")?;

    let entries = state.glossary.put(word_pair, entry)?;
    ApiResponse::json(&entries)
}

/// `DELETE /glossary/{wordPair}`: absent keys are a no-op.
pub async fn delete_word(state: AppState, captures: Captures, _request: Request<Body>) -> ApiResult<ApiResponse> {
    let word_pair = capture(&captures, "wordPair")?;
    let entries = state.glossary.delete(word_pair)?;
    ApiResponse::json(&entries)
}
