// GET handlers: version, health, snapshot and its views, processes, services, ports

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use super::AppState;
use crate::error::CollectError;
use crate::models::Snapshot;
use crate::version::{NAME, VERSION};

/// Upper bound for `?limit=` on /api/processes.
const MAX_PROCESS_LIMIT: usize = 1000;
const MONITORING_TOP_PROCESSES: usize = 10;

pub(super) enum ApiError {
    Collect(CollectError),
    Timeout(Duration),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Collect(e) => {
                tracing::warn!(error = %e, "snapshot request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Timeout(limit) => {
                tracing::warn!(timeout_secs = limit.as_secs(), "snapshot request timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    format!("collection did not finish within {}s", limit.as_secs()),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, CollectError>>,
) -> Result<T, ApiError> {
    match timeout(limit, fut).await {
        Ok(result) => result.map_err(ApiError::Collect),
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

pub(super) async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn snapshot(state: &AppState) -> Result<Snapshot, ApiError> {
    bounded(state.request_timeout, state.builder.build_snapshot()).await
}

/// GET /api/info: one full snapshot.
pub(super) async fn info_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(snapshot(&state).await?).into_response())
}

/// GET /api/monitoring: the dashboard subset of a snapshot.
pub(super) async fn monitoring_handler(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let s = snapshot(&state).await?;
    let top: Vec<_> = s.top_processes.iter().take(MONITORING_TOP_PROCESSES).collect();
    Ok(Json(serde_json::json!({
        "load_average": s.load_average,
        "memory": s.memory,
        "swap": s.swap,
        "cpu": s.cpu,
        "io_stats": s.io_stats,
        "network": {
            "bytes_sent": s.network.bytes_sent,
            "bytes_recv": s.network.bytes_recv,
            "packets_sent": s.network.packets_sent,
            "packets_recv": s.network.packets_recv,
            "errors_in": s.network.errors_in,
            "errors_out": s.network.errors_out,
        },
        "top_processes": top,
        "disk": s.disk,
    }))
    .into_response())
}

pub(super) async fn temperature_handler(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    Ok(Json(snapshot(&state).await?.temperature).into_response())
}

pub(super) async fn iostats_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(Json(snapshot(&state).await?.io_stats).into_response())
}

pub(super) async fn users_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let users = snapshot(&state).await?.users;
    Ok(Json(serde_json::json!({ "users": users })).into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessQuery {
    limit: Option<usize>,
}

/// GET /api/processes: top processes by CPU; `limit` defaults to the configured top-N.
pub(super) async fn processes_handler(
    State(state): State<AppState>,
    Query(query): Query<ProcessQuery>,
) -> Result<Response, ApiError> {
    let n = query
        .limit
        .unwrap_or(state.builder.options().top_processes)
        .min(MAX_PROCESS_LIMIT);
    let processes = bounded(state.request_timeout, async {
        Ok(state.builder.top_processes(n).await)
    })
    .await?;
    Ok(Json(serde_json::json!({ "processes": processes })).into_response())
}

pub(super) async fn services_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let services = bounded(state.request_timeout, async {
        Ok(state.builder.system_services().await)
    })
    .await?;
    Ok(Json(serde_json::json!({ "services": services })).into_response())
}

pub(super) async fn ports_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let ports = bounded(state.request_timeout, state.builder.open_ports()).await?;
    Ok(Json(ports).into_response())
}
