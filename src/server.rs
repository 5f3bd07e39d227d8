//! HTTP API over the [`Aggregator`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check (returns version) |
//! | `GET` | `/position/latest` | Newest position sample |
//! | `GET` | `/position/fetch` | Fetch a sample now, then return the newest |
//! | `GET` | `/position/trend` | Movement between the two newest samples |
//! | `GET` | `/catalog/sync` | Fetch and upsert the dataset catalog |
//! | `GET` | `/catalog/list?limit=N` | Newest catalog entries |
//! | `GET` | `/space/{src}/latest` | Newest cached payload for a feed |
//! | `GET` | `/space/refresh?src=a,b` | Refresh feeds (all five by default) |
//! | `GET` | `/space/summary` | Dashboard summary |
//!
//! # Envelope
//!
//! Every endpoint except `/health` answers HTTP 200 with either
//!
//! ```json
//! { "ok": true, "data": { } }
//! ```
//!
//! or
//!
//! ```json
//! { "ok": false, "error": { "code": "UPSTREAM_5XX", "message": "..." } }
//! ```
//!
//! Error codes come from [`CoreError::code`].
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the dashboard can be
//! served from a different origin.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::aggregator::Aggregator;
use crate::config::Config;
use crate::error::CoreError;

#[derive(Clone)]
struct AppState {
    aggregator: Arc<Aggregator>,
}

/// Bind `[server].bind` and serve until `shutdown` is cancelled.
pub async fn run_server(
    config: &Config,
    aggregator: Arc<Aggregator>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.server.bind).await?;
    info!("HTTP API listening on http://{}", listener.local_addr()?);
    serve(listener, aggregator, shutdown).await
}

/// Serve on an already-bound listener. Used by tests that pick a free port.
pub async fn serve(
    listener: TcpListener,
    aggregator: Arc<Aggregator>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    axum::serve(listener, build_router(aggregator))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("HTTP API stopped");
    Ok(())
}

pub fn build_router(aggregator: Arc<Aggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/position/latest", get(handle_position_latest))
        .route("/position/fetch", get(handle_position_fetch))
        .route("/position/trend", get(handle_position_trend))
        .route("/catalog/sync", get(handle_catalog_sync))
        .route("/catalog/list", get(handle_catalog_list))
        .route("/space/{src}/latest", get(handle_space_latest))
        .route("/space/refresh", get(handle_space_refresh))
        .route("/space/summary", get(handle_space_summary))
        .layer(cors)
        .with_state(AppState { aggregator })
}

// ============ Envelope ============

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    ok: bool,
    data: T,
}

fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope { ok: true, data })
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    ok: bool,
    error: ErrorDetail,
}

/// A failed operation. Rendered with HTTP 200 and `ok: false`.
struct AppError {
    code: String,
    message: String,
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        warn!(code = err.code(), "request failed: {}", err);
        AppError {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        Json(ErrorBody {
            ok: false,
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        })
        .into_response()
    }
}

type ApiResult = Result<Json<Envelope<Value>>, AppError>;

fn no_data() -> Value {
    json!({ "message": "no data" })
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

// ============ /position ============

async fn handle_position_latest(State(state): State<AppState>) -> ApiResult {
    let data = match state.aggregator.latest_position().await? {
        Some(sample) => serde_json::to_value(sample).map_err(CoreError::from)?,
        None => no_data(),
    };
    Ok(ok(data))
}

async fn handle_position_fetch(State(state): State<AppState>) -> ApiResult {
    let data = match state.aggregator.fetch_position().await? {
        Some(sample) => serde_json::to_value(sample).map_err(CoreError::from)?,
        None => no_data(),
    };
    Ok(ok(data))
}

async fn handle_position_trend(State(state): State<AppState>) -> ApiResult {
    let trend = state.aggregator.position_trend().await?;
    Ok(ok(serde_json::to_value(trend).map_err(CoreError::from)?))
}

// ============ /catalog ============

async fn handle_catalog_sync(State(state): State<AppState>) -> ApiResult {
    let written = state.aggregator.sync_catalog().await?;
    Ok(ok(json!({ "written": written })))
}

#[derive(Deserialize)]
struct ListParams {
    limit: Option<i64>,
}

async fn handle_catalog_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult {
    let items = state.aggregator.list_catalog(params.limit).await?;
    Ok(ok(json!({ "items": items })))
}

// ============ /space ============

async fn handle_space_latest(State(state): State<AppState>, Path(src): Path<String>) -> ApiResult {
    let data = match state.aggregator.cached(&src).await? {
        Some(entry) => serde_json::to_value(entry).map_err(CoreError::from)?,
        None => json!({ "source": src, "message": "no data" }),
    };
    Ok(ok(data))
}

#[derive(Deserialize)]
struct RefreshParams {
    src: Option<String>,
}

async fn handle_space_refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> ApiResult {
    let refreshed: Vec<&str> = state
        .aggregator
        .refresh_list(params.src.as_deref())
        .await
        .into_iter()
        .map(|s| s.as_str())
        .collect();
    Ok(ok(json!({ "refreshed": refreshed })))
}

async fn handle_space_summary(State(state): State<AppState>) -> ApiResult {
    let summary = state.aggregator.summary().await;
    Ok(ok(serde_json::to_value(summary).map_err(CoreError::from)?))
}
