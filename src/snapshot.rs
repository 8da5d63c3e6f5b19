//! Snapshot wire types shared by the store server and the board coordinator.
//!
//! DESIGN
//! ======
//! A snapshot is a versioned capture of board state. The store assigns `id`,
//! `version`, and `created_at`; the payload is opaque to everything except
//! the canvas that produced it. Timestamps travel as epoch milliseconds.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Why a save was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveReason {
    /// Periodic autosave tick.
    Interval,
    /// User-requested save (keyboard shortcut, command palette, stdin).
    Manual,
}

impl SaveReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interval => "interval",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for SaveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A persisted snapshot including its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    pub version: i64,
    pub created_at: i64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub snapshot: serde_json::Value,
}

impl Snapshot {
    #[must_use]
    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            id: self.id.clone(),
            version: self.version,
            created_at: self.created_at,
            reason: self.reason.clone(),
        }
    }
}

/// List entry returned by the store. Carries no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: String,
    pub version: i64,
    pub created_at: i64,
    #[serde(default)]
    pub reason: String,
}

/// Create-snapshot request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewSnapshot {
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub client_ts: Option<i64>,
    #[serde(default)]
    pub snapshot: serde_json::Value,
}

impl NewSnapshot {
    #[must_use]
    pub fn new(reason: SaveReason, client_ts: i64, snapshot: serde_json::Value) -> Self {
        Self { reason: reason.as_str().to_owned(), client_ts: Some(client_ts), snapshot }
    }
}

/// Current wall-clock time in epoch milliseconds. Returns 0 if the clock is
/// before the epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
