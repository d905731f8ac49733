//! HTTP front end for the bulk image resolver.
//!
//! Routes:
//!
//! - `GET /` liveness probe
//! - `GET /health` health probe with the current cache size
//! - `POST /api/bulk_images` resolve a batch of locations

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scenery_search::{bing_orchestrator, BingImages, BulkOrchestrator, ImageSource};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{SceneryConfig, ServerConfig};
use crate::error::{Result, ServerError};

/// Service name reported by the probes.
pub const SERVICE_NAME: &str = "image-scraper";

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

/// Shared state for axum handlers.
struct AppState<S> {
    orchestrator: Arc<BulkOrchestrator<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}

/// Build the service router over `orchestrator`.
pub fn router<S>(orchestrator: Arc<BulkOrchestrator<S>>, config: &ServerConfig) -> Router
where
    S: ImageSource + 'static,
{
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health::<S>))
        .route("/api/bulk_images", post(handle_bulk_images::<S>))
        .layer(cors_layer(&config.allowed_origins))
        .with_state(AppState { orchestrator })
}

/// CORS for the browser front end.
///
/// `"*"` in the origin list allows any origin. An entry ending in `:*`,
/// such as `http://localhost:*`, allows that scheme and host on any port.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any);

    if allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let patterns: Vec<String> = allowed_origins.to_vec();
    layer.allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
        origin
            .to_str()
            .map(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
            .unwrap_or(false)
    }))
}

/// Whether `origin` is allowed by `pattern`.
fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) if prefix.ends_with(':') => origin
            .strip_prefix(prefix)
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        _ => pattern == origin,
    }
}

// ---------------------------------------------------------------------------
// SceneryServer
// ---------------------------------------------------------------------------

/// The running HTTP service.
///
/// Serves in a background tokio task that is aborted when the server is
/// dropped.
pub struct SceneryServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl SceneryServer {
    /// Start the service against Bing Images.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the listener cannot bind.
    pub async fn start(config: &SceneryConfig) -> Result<Self> {
        let orchestrator: BulkOrchestrator<BingImages> = bing_orchestrator(&config.search)?;
        Self::start_with(Arc::new(orchestrator), &config.server).await
    }

    /// Start the service over an already built orchestrator.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start_with<S>(
        orchestrator: Arc<BulkOrchestrator<S>>,
        config: &ServerConfig,
    ) -> Result<Self>
    where
        S: ImageSource + 'static,
    {
        let app = router(orchestrator, config);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| ServerError::Bind(format!("{bind_addr}: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ServerError::Bind(format!("failed to get local addr: {e}")))?;

        tracing::info!("image service listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("image service error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }

    /// Wait for the server task to end.
    ///
    /// # Errors
    ///
    /// Returns an error if the task panicked.
    pub async fn wait(&mut self) -> Result<()> {
        (&mut self.handle)
            .await
            .map_err(|e| ServerError::Io(std::io::Error::other(e.to_string())))
    }
}

impl Drop for SceneryServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_root() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
    }))
}

async fn handle_health<S: ImageSource>(State(state): State<AppState<S>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "cache_size": state.orchestrator.cache_size().await,
        "service": SERVICE_NAME,
    }))
}

async fn handle_bulk_images<S: ImageSource>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Response {
    let body: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting non-JSON body");
            return detail(StatusCode::BAD_REQUEST, "Request body must be JSON");
        }
    };

    match state.orchestrator.handle_json(body).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.into_response())).into_response(),
        // Upstream failures are absorbed per query, so any error here is a
        // rejected request shape.
        Err(e) => {
            let reason = e.reason();
            tracing::debug!(%reason, "rejecting batch");
            detail(StatusCode::BAD_REQUEST, &reason)
        }
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}
