//! `/talks` handlers.

use axum::body::Body;
use axum::http::Request;

use crate::http::error::{ApiError, ApiResult};
use crate::http::handlers::capture;
use crate::http::request::{clamp_wait, decode_json, known_version, read_body, wait_hint};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::notify::PollOutcome;
use crate::routing::Captures;
use crate::store::{Comment, TalkPoll, TalkProposal};

fn no_talk(title: &str) -> ApiError {
    ApiError::NotFound(format!("No talk '{title}' found"))
}

/// `GET /talks`: the talk list, or a long poll for the next change.
pub async fn list_talks(state: AppState, _captures: Captures, request: Request<Body>) -> ApiResult<ApiResponse> {
    let known = known_version(request.headers());
    let wait = wait_hint(request.headers()).map(|secs| clamp_wait(secs, state.long_poll.max_wait_secs));

    match state.talks.poll(known, wait) {
        TalkPoll::Current(snapshot) => ApiResponse::talks(&snapshot),
        TalkPoll::NotModified => Ok(ApiResponse::not_modified()),
        TalkPoll::Waiting(pending) => {
            let waiter = pending.id();
            match pending.outcome().await {
                PollOutcome::Changed(snapshot) => {
                    tracing::debug!(%waiter, version = snapshot.version, "Long poll served change");
                    ApiResponse::talks(&snapshot)
                }
                PollOutcome::NotModified => Ok(ApiResponse::not_modified()),
            }
        }
    }
}

/// `GET /talks/{title}`
pub async fn get_talk(state: AppState, captures: Captures, _request: Request<Body>) -> ApiResult<ApiResponse> {
    let title = capture(&captures, "title")?;
    match state.talks.get(title) {
        Some(talk) => ApiResponse::json(&talk),
        None => Err(no_talk(title)),
    }
}

/// `PUT /talks/{title}`: create or replace.
pub async fn put_talk(state: AppState, captures: Captures, request: Request<Body>) -> ApiResult<ApiResponse> {
    let title = capture(&captures, "title")?;
    let body = read_body(request, state.max_body_bytes).await?;
    let proposal: TalkProposal = decode_json(&body, "talk")?;

    state.talks.put(title, proposal);
    Ok(ApiResponse::no_content())
}

/// `DELETE /talks/{title}`: always 204, even for an unknown title.
pub async fn delete_talk(state: AppState, captures: Captures, _request: Request<Body>) -> ApiResult<ApiResponse> {
    let title = capture(&captures, "title")?;
    if state.talks.delete(title).is_none() {
        tracing::debug!(title, "Delete of unknown talk ignored");
    }
    Ok(ApiResponse::no_content())
}

/// `POST /talks/{title}/comments`
pub async fn add_comment(state: AppState, captures: Captures, request: Request<Body>) -> ApiResult<ApiResponse> {
    let title = capture(&captures, "title")?;
    let body = read_body(request, state.max_body_bytes).await?;
    let comment: Comment = decode_json(&body, "comment")?;

    match state.talks.add_comment(title, comment) {
        Some(_) => Ok(ApiResponse::no_content()),
        None => Err(no_talk(title)),
    }
}
