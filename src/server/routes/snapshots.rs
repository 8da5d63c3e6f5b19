//! Board snapshot routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use tracing::{error, info};

use crate::server::services::snapshot::{self, SnapshotServiceError};
use crate::server::state::AppState;
use crate::snapshot::{NewSnapshot, Snapshot, SnapshotSummary};

/// `POST /v1/projects/:project_id/board/snapshots` — persist a new snapshot.
pub async fn create_snapshot(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(body): Json<NewSnapshot>,
) -> Result<Json<Snapshot>, StatusCode> {
    let reason = body.reason.clone();
    let row = snapshot::create_snapshot(&state.pool, &project_id, body, state.create_retries)
        .await
        .map_err(snapshot_error_to_status)?;
    info!(project_id = %row.project_id, version = row.version, %reason, "snapshot created");
    Ok(Json(row.into_snapshot()))
}

/// `GET /v1/projects/:project_id/board/snapshots` — list snapshots, newest first.
pub async fn list_snapshots(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<SnapshotSummary>>, StatusCode> {
    let rows = snapshot::list_snapshots(&state.pool, &project_id)
        .await
        .map_err(snapshot_error_to_status)?;
    Ok(Json(rows))
}

/// `GET /v1/projects/:project_id/board/snapshots/:snapshot_id` — fetch one snapshot.
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path((project_id, snapshot_id)): Path<(String, String)>,
) -> Result<Json<Snapshot>, StatusCode> {
    let row = snapshot::get_snapshot(&state.pool, &project_id, &snapshot_id)
        .await
        .map_err(snapshot_error_to_status)?;
    Ok(Json(row.into_snapshot()))
}

pub(crate) fn snapshot_error_to_status(err: SnapshotServiceError) -> StatusCode {
    match err {
        SnapshotServiceError::InvalidProject => StatusCode::BAD_REQUEST,
        SnapshotServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        SnapshotServiceError::VersionConflict(project_id) => {
            error!(%project_id, "snapshot version allocation exhausted retries");
            StatusCode::CONFLICT
        }
        SnapshotServiceError::Database(e) => {
            error!(error = %e, "snapshot query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "snapshots_test.rs"]
mod tests;
