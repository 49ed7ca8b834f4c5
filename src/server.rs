//! HTTP surface for the relay.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/chat` (`server.path`) | Relay one chat turn |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Chat contract
//!
//! Request:
//!
//! ```json
//! { "message": "What are the prereqs for ISA 401?", "previous_response_id": "resp_..." }
//! ```
//!
//! Success (`200`):
//!
//! ```json
//! { "previous_response_id": "resp_...", "text": "...", "debug": { } }
//! ```
//!
//! `debug` only appears when `server.include_debug = true`.
//!
//! Errors use `{"error": "<message>"}` with `400` for validation failures
//! and `500` for everything else (see [`RelayError`]).
//!
//! If configuration could not be resolved at startup the server still
//! runs, and every chat request answers `500` with the configuration error
//! before its body is read.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{json_response, RelayError};
use crate::relay::Relay;

/// Upper bound on inbound chat bodies.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Shared application state passed to route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The relay, or the configuration error every chat request reports.
    relay: Arc<Result<Relay, String>>,
}

impl AppState {
    pub fn new(relay: Result<Relay, RelayError>) -> Self {
        Self {
            relay: Arc::new(relay.map_err(|e| e.to_string())),
        }
    }
}

/// Build the router with the chat handler mounted at `chat_path`.
pub fn router(state: AppState, chat_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(chat_path, post(handle_chat))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `config.server.bind` and serve until the process is terminated.
pub async fn run_server(config: &Config, relay: Result<Relay, RelayError>) -> anyhow::Result<()> {
    if let Err(e) = &relay {
        tracing::warn!(error = %e, "relay is not configured; chat requests will fail with 500");
    }

    let app = router(AppState::new(relay), &config.server.path);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        path = %config.server.path,
        "chat relay listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ POST /chat ============

/// Run one chat turn and map the outcome to a JSON response.
///
/// Success is `200` with a [`ChatReply`](crate::relay::ChatReply) body;
/// failures go through [`RelayError`]'s `IntoResponse` and are logged.
async fn handle_chat(State(state): State<AppState>, request: Request) -> Response {
    match chat(&state, request).await {
        Ok(reply) => json_response(StatusCode::OK, &reply),
        Err(e) => {
            if e.status().is_server_error() {
                tracing::error!(kind = e.kind(), error = %e, "chat request failed");
            } else {
                tracing::warn!(kind = e.kind(), error = %e, "chat request rejected");
            }
            e.into_response()
        }
    }
}

async fn chat(state: &AppState, request: Request) -> Result<crate::relay::ChatReply, RelayError> {
    let relay = match &*state.relay {
        Ok(relay) => relay,
        Err(message) => return Err(RelayError::Configuration(message.clone())),
    };

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| RelayError::BadRequest(format!("Failed to read request body: {}", e)))?;

    relay.handle_body(&body).await
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
