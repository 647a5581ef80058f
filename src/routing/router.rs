//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Look up the first route matching method and full path
//! - Invoke its handler with the shared context and decoded captures
//! - Return the handler's future or hand the request back on no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - First match wins, so registration order is significant
//! - Explicit NoMatch carrying the request so callers can fall through

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use futures_util::future::BoxFuture;

use crate::routing::pattern::{Captures, InvalidCapture, PathPattern, PatternError};

type Handler<C, T> = Arc<dyn Fn(C, Captures, Request<Body>) -> BoxFuture<'static, T> + Send + Sync>;

struct Route<C, T> {
    method: Method,
    pattern: PathPattern,
    handler: Handler<C, T>,
}

/// Outcome of resolving a request.
pub enum Resolution<T> {
    /// A route matched; awaiting the future runs its handler.
    Matched(BoxFuture<'static, T>),
    /// A route matched but a capture was not valid percent-encoded UTF-8.
    InvalidCapture(InvalidCapture),
    /// No route matched; the untouched request is returned to the caller.
    NoMatch(Request<Body>),
}

/// Ordered method + path-template routing table.
pub struct Router<C, T> {
    routes: Vec<Route<C, T>>,
}

impl<C, T> Router<C, T>
where
    C: Send + 'static,
    T: Send + 'static,
{
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a rule. Rules are tried in the order they were added.
    pub fn add<F, Fut>(&mut self, method: Method, pattern: &str, handler: F) -> Result<(), PatternError>
    where
        F: Fn(C, Captures, Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let pattern = PathPattern::parse(pattern)?;
        let handler: Handler<C, T> = Arc::new(
            move |ctx: C, captures: Captures, request: Request<Body>| -> BoxFuture<'static, T> {
                Box::pin(handler(ctx, captures, request))
            },
        );
        self.routes.push(Route {
            method,
            pattern,
            handler,
        });
        Ok(())
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first rule matching the request and start its handler.
    pub fn resolve(&self, context: C, request: Request<Body>) -> Resolution<T> {
        let path = request.uri().path();

        for route in &self.routes {
            tracing::trace!(
                method = %request.method(),
                path = %path,
                rule_method = %route.method,
                rule = route.pattern.as_str(),
                "Trying route"
            );

            if route.method != *request.method() {
                continue;
            }
            let Some(raw) = route.pattern.match_path(path) else {
                continue;
            };

            return match Captures::decode(raw) {
                Ok(captures) => {
                    tracing::debug!(
                        method = %route.method,
                        rule = route.pattern.as_str(),
                        captures = ?captures.values().collect::<Vec<_>>(),
                        "Route matched"
                    );
                    Resolution::Matched((route.handler)(context, captures, request))
                }
                Err(err) => {
                    tracing::debug!(rule = route.pattern.as_str(), error = %err, "Undecodable capture");
                    Resolution::InvalidCapture(err)
                }
            };
        }

        tracing::debug!(method = %request.method(), path = %path, "No route matched");
        Resolution::NoMatch(request)
    }
}

impl<C, T> Default for Router<C, T>
where
    C: Send + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
