//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the snapshot store endpoints consumed by board sessions, plus a
//! health probe, under a single Axum router with permissive CORS and HTTP
//! tracing.

pub mod snapshots;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::state::AppState;

/// Snapshot store API routes.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/v1/projects/{project_id}/board/snapshots",
            get(snapshots::list_snapshots).post(snapshots::create_snapshot),
        )
        .route(
            "/v1/projects/{project_id}/board/snapshots/{snapshot_id}",
            get(snapshots::get_snapshot),
        )
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
