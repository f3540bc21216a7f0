// HTTP JSON routes over the snapshot builder

mod http;

use axum::{Router, routing::get};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::snapshot::SnapshotBuilder;
use crate::version;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) builder: SnapshotBuilder,
    pub(crate) request_timeout: Duration,
}

pub fn app(builder: SnapshotBuilder, config: &AppConfig) -> Router {
    let state = AppState {
        builder,
        request_timeout: config.request_timeout(),
    };
    Router::new()
        .route("/", get(|| async { version::banner() })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .route("/api/info", get(http::info_handler)) // GET /api/info
        .route("/api/processes", get(http::processes_handler)) // GET /api/processes?limit=N
        .route("/api/monitoring", get(http::monitoring_handler)) // GET /api/monitoring
        .route("/api/temperature", get(http::temperature_handler)) // GET /api/temperature
        .route("/api/iostats", get(http::iostats_handler)) // GET /api/iostats
        .route("/api/users", get(http::users_handler)) // GET /api/users
        .route("/api/services", get(http::services_handler)) // GET /api/services
        .route("/api/ports", get(http::ports_handler)) // GET /api/ports
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
