//! The API routing table.

use axum::http::Method;

use crate::http::error::ApiResult;
use crate::http::handlers::{glossary, talks};
use crate::http::response::ApiResponse;
use crate::http::server::AppState;
use crate::routing::{PatternError, Router};

/// Router type used by the endpoint layer.
pub type ApiRouter = Router<AppState, ApiResult<ApiResponse>>;

pub const TALKS: &str = "/talks";
pub const TALK: &str = "/talks/{title}";
pub const TALK_COMMENTS: &str = "/talks/{title}/comments";
pub const GLOSSARY: &str = "/glossary";
pub const WORD: &str = "/glossary/{word}";
pub const WORD_PAIR: &str = "/glossary/{wordPair}";

/// Build the API routing table. Order matters: first match wins.
pub fn api_routes() -> Result<ApiRouter, PatternError> {
    let mut router = ApiRouter::new();

    router.add(Method::GET, TALK, talks::get_talk)?;
    router.add(Method::GET, WORD, glossary::get_word)?;
    router.add(Method::DELETE, TALK, talks::delete_talk)?;
    router.add(Method::DELETE, WORD_PAIR, glossary::delete_word)?;
    router.add(Method::PUT, TALK, talks::put_talk)?;
    router.add(Method::PUT, WORD_PAIR, glossary::put_word)?;
    router.add(Method::POST, TALK_COMMENTS, talks::add_comment)?;
    router.add(Method::GET, TALKS, talks::list_talks)?;
    router.add(Method::GET, GLOSSARY, glossary::list_words)?;

    tracing::debug!(routes = router.len(), "API routes compiled");
    Ok(router)
}
