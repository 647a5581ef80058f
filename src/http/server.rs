//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state (talk board, glossary, persistence writer)
//! - Create the Axum app with all middleware (tracing, request ID, limits)
//! - Dispatch every request through the API router, falling back to
//!   static files
//! - Turn handler results, errors and panics into responses
//! - Run until a shutdown signal or a fatal persistence failure

use std::future::IntoFuture;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use futures_util::FutureExt;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, oneshot};
use tower::ServiceExt;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{LongPollConfig, ServerConfig};
use crate::http::error::ApiError;
use crate::http::request::{request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::http::response::ApiResponse;
use crate::http::routes::{api_routes, ApiRouter};
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{PatternError, Resolution};
use crate::store::{load_glossary, Glossary, GlossaryWriter, PersistenceError, TalkBoard, WriterTask};

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route table: {0}")]
    Routes(#[from] PatternError),

    #[error("glossary persistence failed: {0}")]
    Persistence(#[from] PersistenceError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub talks: Arc<TalkBoard>,
    pub glossary: Arc<Glossary>,
    pub long_poll: LongPollConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    /// Fresh state with an unpersisted glossary and default limits.
    pub fn in_memory() -> Self {
        let config = ServerConfig::default();
        Self {
            talks: Arc::new(TalkBoard::new()),
            glossary: Arc::new(Glossary::in_memory()),
            long_poll: config.long_poll,
            max_body_bytes: config.limits.max_body_bytes,
        }
    }
}

#[derive(Clone)]
struct Endpoint {
    app: AppState,
    routes: Arc<ApiRouter>,
    static_files: Option<ServeDir>,
}

/// HTTP server for the talk board.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    state: AppState,
    writer_task: Option<WriterTask>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Loads the glossary and starts its writer, so this must run inside a
    /// Tokio runtime.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let (glossary, writer_task) = if config.storage.persist_glossary {
            let path = PathBuf::from(&config.storage.glossary_path);
            let entries = load_glossary(&path);
            let (writer, task) = GlossaryWriter::spawn(path);
            (Glossary::new(entries, Some(writer)), Some(task))
        } else {
            (Glossary::in_memory(), None)
        };

        let state = AppState {
            talks: Arc::new(TalkBoard::new()),
            glossary: Arc::new(glossary),
            long_poll: config.long_poll.clone(),
            max_body_bytes: config.limits.max_body_bytes,
        };

        let endpoint = Endpoint {
            app: state.clone(),
            routes: Arc::new(api_routes()?),
            static_files: config
                .static_files
                .enabled
                .then(|| ServeDir::new(&config.static_files.root)),
        };

        let router = Self::build_router(&config, endpoint);
        Ok(Self {
            router,
            config,
            state,
            writer_task,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, endpoint: Endpoint) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(endpoint)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    /// Shared state, for inspection.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until Ctrl+C/SIGTERM, a message on `shutdown`,
    /// or a glossary write failure (returned as an error).
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let (fatal_tx, mut fatal_rx) = mpsc::channel::<PersistenceError>(1);
        if let Some(task) = self.writer_task {
            tokio::spawn(async move {
                match task.await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        let _ = fatal_tx.send(e).await;
                    }
                    Err(e) => tracing::error!(error = %e, "Glossary writer task panicked"),
                }
            });
        }

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .into_future();
        let mut server = tokio::spawn(serve);

        let outcome = tokio::select! {
            _ = shutdown.recv() => Ok(()),
            _ = shutdown_signal() => Ok(()),
            Some(err) = fatal_rx.recv() => {
                tracing::error!(error = %err, "Fatal persistence error, shutting down");
                Err(ServerError::Persistence(err))
            }
            res = &mut server => {
                return match res {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => Err(ServerError::Io(e)),
                    Err(e) => Err(ServerError::Io(std::io::Error::other(e))),
                };
            }
        };

        tracing::info!("Shutdown signal received");
        // Open long polls would otherwise hold the graceful shutdown open.
        self.state.talks.release_waiters();
        let _ = stop_tx.send(());

        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        match tokio::time::timeout(grace, &mut server).await {
            Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(grace_secs = grace.as_secs(), "Graceful shutdown timed out");
                server.abort();
            }
        }

        tracing::info!("HTTP server stopped");
        outcome
    }
}

/// Route a request through the API table or fall through to static files.
async fn dispatch(State(endpoint): State<Endpoint>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    tracing::debug!(request_id = %request_id, method = %method, path = %path, "Dispatching request");

    match endpoint.routes.resolve(endpoint.app.clone(), request) {
        Resolution::Matched(handler) => {
            let response = match AssertUnwindSafe(handler).catch_unwind().await {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    if err.status().is_server_error() {
                        tracing::error!(request_id = %request_id, path = %path, error = %err, "Handler failed");
                    }
                    ApiResponse::from(err)
                }
                Err(panic) => {
                    let cause = panic_message(panic.as_ref());
                    tracing::error!(request_id = %request_id, path = %path, cause = %cause, "Handler panicked");
                    ApiResponse::from(ApiError::Internal(cause))
                }
            };
            metrics::record_request(&method, response.status.as_u16(), "api", start);
            response.into_response()
        }
        Resolution::InvalidCapture(err) => {
            let response = ApiResponse::from(ApiError::from(err));
            metrics::record_request(&method, response.status.as_u16(), "api", start);
            response.into_response()
        }
        Resolution::NoMatch(request) => {
            let response = match endpoint.static_files {
                Some(files) => match files.oneshot(request).await {
                    Ok(response) => response.into_response(),
                    Err(never) => match never {},
                },
                None => (StatusCode::NOT_FOUND, "Not found").into_response(),
            };
            metrics::record_request(&method, response.status().as_u16(), "static", start);
            response
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
