//! HTTP client for the snapshot store.
//!
//! Thin `reqwest` wrapper over `/v1/projects/{project_id}/board/snapshots`.
//! Status and body handling live in `parse_body` so they can be tested
//! without a server.

use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;

use super::store::{SnapshotStore, StoreError};
use crate::config::ApiConfig;
use crate::snapshot::{NewSnapshot, Snapshot, SnapshotSummary};

pub struct HttpSnapshotStore {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpSnapshotStore {
    /// Build a client for the store at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self, StoreError> {
        let base_url = parse_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    fn snapshots_url(&self, project_id: &str, snapshot_id: Option<&str>) -> Result<Url, StoreError> {
        let mut segments = vec!["v1", "projects", project_id, "board", "snapshots"];
        if let Some(id) = snapshot_id {
            segments.push(id);
        }
        endpoint(&self.base_url, &segments)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        parse_body(status, &text)
    }
}

#[async_trait::async_trait]
impl SnapshotStore for HttpSnapshotStore {
    async fn list_snapshots(&self, project_id: &str) -> Result<Vec<SnapshotSummary>, StoreError> {
        let url = self.snapshots_url(project_id, None)?;
        self.send(self.http.get(url)).await
    }

    async fn create_snapshot(&self, project_id: &str, body: &NewSnapshot) -> Result<Snapshot, StoreError> {
        let url = self.snapshots_url(project_id, None)?;
        self.send(self.http.post(url).json(body)).await
    }

    async fn get_snapshot(&self, project_id: &str, snapshot_id: &str) -> Result<Snapshot, StoreError> {
        let url = self.snapshots_url(project_id, Some(snapshot_id))?;
        self.send(self.http.get(url)).await
    }
}

// =============================================================================
// URL + BODY HELPERS
// =============================================================================

fn parse_base_url(raw: &str) -> Result<Url, StoreError> {
    let url = Url::parse(raw).map_err(|_| StoreError::InvalidBaseUrl(raw.to_owned()))?;
    if url.cannot_be_a_base() {
        return Err(StoreError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(url)
}

/// Append percent-encoded `segments` to `base`, keeping any base path prefix.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, StoreError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| StoreError::InvalidBaseUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T, StoreError> {
    if !(200..300).contains(&status) {
        return Err(StoreError::Http { status, body: text.to_owned() });
    }
    serde_json::from_str(text).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
