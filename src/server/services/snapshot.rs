//! Snapshot service — versioned board snapshots per project.
//!
//! DESIGN
//! ======
//! Versions are allocated by the insert itself (`MAX(version) + 1` for the
//! project). The unique `(project_id, version)` constraint turns a race
//! between two creates into a conflict on one of them, which is retried with
//! a fresh version instead of surfacing to the client.

use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::snapshot::{NewSnapshot, Snapshot, SnapshotSummary, now_ms};

const LIST_LIMIT: i64 = 200;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotServiceError {
    #[error("project id must not be empty")]
    InvalidProject,
    #[error("snapshot not found: {0}")]
    NotFound(String),
    #[error("version allocation kept conflicting for project {0}")]
    VersionConflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct SnapshotRow {
    pub id: Uuid,
    pub project_id: String,
    pub version: i64,
    pub reason: String,
    pub client_ts: Option<i64>,
    pub created_at: i64,
    pub snapshot: Value,
}

impl SnapshotRow {
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            id: self.id.to_string(),
            version: self.version,
            created_at: self.created_at,
            reason: self.reason,
            snapshot: self.snapshot,
        }
    }
}

/// Trimmed project id, or `InvalidProject` if nothing is left.
pub fn validate_project_id(raw: &str) -> Result<&str, SnapshotServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SnapshotServiceError::InvalidProject);
    }
    Ok(trimmed)
}

/// Missing payloads are stored as an empty object.
fn normalize_payload(snapshot: Value) -> Value {
    if snapshot.is_null() { serde_json::json!({}) } else { snapshot }
}

fn is_version_conflict(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn create_snapshot(
    pool: &PgPool,
    project_id: &str,
    body: NewSnapshot,
    retries: usize,
) -> Result<SnapshotRow, SnapshotServiceError> {
    let project_id = validate_project_id(project_id)?;
    let mut row = SnapshotRow {
        id: Uuid::new_v4(),
        project_id: project_id.to_owned(),
        version: 0,
        reason: body.reason,
        client_ts: body.client_ts,
        created_at: now_ms(),
        snapshot: normalize_payload(body.snapshot),
    };

    for attempt in 1..=retries {
        match insert_next_version(pool, &row).await {
            Ok(version) => {
                row.version = version;
                return Ok(row);
            }
            Err(e) if is_version_conflict(&e) && attempt < retries => {
                warn!(project_id, attempt, total = retries, "snapshot version conflict; retrying");
            }
            Err(e) if is_version_conflict(&e) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Err(SnapshotServiceError::VersionConflict(project_id.to_owned()))
}

async fn insert_next_version(pool: &PgPool, row: &SnapshotRow) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO board_snapshots (id, project_id, version, reason, client_ts, created_at, snapshot)
         SELECT $1, $2, COALESCE(MAX(version), 0) + 1, $3, $4, $5, $6
         FROM board_snapshots
         WHERE project_id = $2
         RETURNING version",
    )
    .bind(row.id)
    .bind(&row.project_id)
    .bind(&row.reason)
    .bind(row.client_ts)
    .bind(row.created_at)
    .bind(&row.snapshot)
    .fetch_one(pool)
    .await
}

/// Snapshot summaries for a project, highest version first.
pub async fn list_snapshots(pool: &PgPool, project_id: &str) -> Result<Vec<SnapshotSummary>, SnapshotServiceError> {
    let project_id = validate_project_id(project_id)?;
    let rows = sqlx::query_as::<_, (Uuid, i64, i64, String)>(
        "SELECT id, version, created_at, reason
         FROM board_snapshots
         WHERE project_id = $1
         ORDER BY version DESC
         LIMIT $2",
    )
    .bind(project_id)
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, version, created_at, reason)| SnapshotSummary { id: id.to_string(), version, created_at, reason })
        .collect())
}

pub async fn get_snapshot(pool: &PgPool, project_id: &str, snapshot_id: &str) -> Result<SnapshotRow, SnapshotServiceError> {
    let project_id = validate_project_id(project_id)?;
    let Ok(id) = Uuid::parse_str(snapshot_id) else {
        return Err(SnapshotServiceError::NotFound(snapshot_id.to_owned()));
    };

    let row = sqlx::query_as::<_, (Uuid, String, i64, String, Option<i64>, i64, Value)>(
        "SELECT id, project_id, version, reason, client_ts, created_at, snapshot
         FROM board_snapshots
         WHERE project_id = $1 AND id = $2",
    )
    .bind(project_id)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| SnapshotServiceError::NotFound(snapshot_id.to_owned()))?;

    let (id, project_id, version, reason, client_ts, created_at, snapshot) = row;
    Ok(SnapshotRow { id, project_id, version, reason, client_ts, created_at, snapshot })
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
