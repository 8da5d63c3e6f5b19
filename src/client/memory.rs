//! Process-local snapshot store for offline sessions.
//!
//! Versions are assigned `max + 1` per project under a single lock, so
//! concurrent creates never share a version.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use super::store::{SnapshotStore, StoreError};
use crate::snapshot::{NewSnapshot, Snapshot, SnapshotSummary, now_ms};

#[derive(Default)]
pub struct MemorySnapshotStore {
    projects: Mutex<HashMap<String, Vec<Snapshot>>>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project with existing snapshots.
    pub fn insert(&self, project_id: &str, snapshot: Snapshot) {
        let mut projects = self
            .projects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        projects.entry(project_id.to_owned()).or_default().push(snapshot);
    }

    /// Number of snapshots stored for `project_id`.
    #[must_use]
    pub fn len(&self, project_id: &str) -> usize {
        let projects = self
            .projects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        projects.get(project_id).map_or(0, Vec::len)
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn list_snapshots(&self, project_id: &str) -> Result<Vec<SnapshotSummary>, StoreError> {
        let projects = self
            .projects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut list: Vec<SnapshotSummary> = projects
            .get(project_id)
            .map(|rows| rows.iter().map(Snapshot::summary).collect())
            .unwrap_or_default();
        list.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(list)
    }

    async fn create_snapshot(&self, project_id: &str, body: &NewSnapshot) -> Result<Snapshot, StoreError> {
        let mut projects = self
            .projects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let rows = projects.entry(project_id.to_owned()).or_default();
        let version = rows.iter().map(|s| s.version).max().unwrap_or(0) + 1;
        let snapshot = Snapshot {
            id: Uuid::new_v4().to_string(),
            version,
            created_at: now_ms(),
            reason: body.reason.clone(),
            snapshot: body.snapshot.clone(),
        };
        rows.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn get_snapshot(&self, project_id: &str, snapshot_id: &str) -> Result<Snapshot, StoreError> {
        let projects = self
            .projects
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        projects
            .get(project_id)
            .and_then(|rows| rows.iter().find(|s| s.id == snapshot_id))
            .cloned()
            .ok_or_else(|| StoreError::Http { status: 404, body: "Snapshot not found".to_owned() })
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
