//! Snapshot store boundary used by the board coordinator.

use crate::snapshot::{NewSnapshot, Snapshot, SnapshotSummary};

/// Errors produced by snapshot store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request could not be sent or completed.
    #[error("request failed: {0}")]
    Network(String),

    /// The store answered with a non-2xx status.
    #[error("store responded with status {status}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// The configured base URL cannot carry path segments.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl StoreError {
    /// Short label for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Decode(_) => "decode",
            Self::InvalidBaseUrl(_) => "config",
        }
    }
}

/// Remote snapshot history for project boards.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// List persisted snapshots for a project, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the response is malformed.
    async fn list_snapshots(&self, project_id: &str) -> Result<Vec<SnapshotSummary>, StoreError>;

    /// Persist a new snapshot. The store assigns id and version.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the request fails or the response is malformed.
    async fn create_snapshot(&self, project_id: &str, body: &NewSnapshot) -> Result<Snapshot, StoreError>;

    /// Fetch a single snapshot with its payload.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the snapshot does not exist or the request fails.
    async fn get_snapshot(&self, project_id: &str, snapshot_id: &str) -> Result<Snapshot, StoreError>;
}
