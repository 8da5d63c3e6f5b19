//! Runtime configuration parsed from environment variables.
//!
//! Every knob has a compiled default; unparsable values fall back to the
//! default rather than failing startup.

use std::time::Duration;

pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 3000;
pub const MIN_AUTOSAVE_INTERVAL_MS: u64 = 100;
pub const DEFAULT_SAVE_LOG_CAPACITY: usize = 5;
pub const DEFAULT_AUTOSAVE_FAILURE_THRESHOLD: u32 = 3;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_API_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Parse `key` from the environment, falling back to `default` when the
/// variable is missing or malformed.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// Tuning knobs for a board session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Period between autosave ticks.
    pub autosave_interval: Duration,
    /// Maximum entries kept in the recent-save log.
    pub save_log_capacity: usize,
    /// Consecutive failures before the degraded warning fires. 0 disables it.
    pub failure_threshold: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_millis(DEFAULT_AUTOSAVE_INTERVAL_MS),
            save_log_capacity: DEFAULT_SAVE_LOG_CAPACITY,
            failure_threshold: DEFAULT_AUTOSAVE_FAILURE_THRESHOLD,
        }
    }
}

impl CoordinatorConfig {
    /// Build from environment variables.
    ///
    /// - `AUTOSAVE_INTERVAL_MS`: default 3000, floored at 100
    /// - `SAVE_LOG_CAPACITY`: default 5, floored at 1
    /// - `AUTOSAVE_FAILURE_THRESHOLD`: default 3
    #[must_use]
    pub fn from_env() -> Self {
        let interval_ms = env_parse("AUTOSAVE_INTERVAL_MS", DEFAULT_AUTOSAVE_INTERVAL_MS).max(MIN_AUTOSAVE_INTERVAL_MS);
        Self {
            autosave_interval: Duration::from_millis(interval_ms),
            save_log_capacity: env_parse("SAVE_LOG_CAPACITY", DEFAULT_SAVE_LOG_CAPACITY).max(1),
            failure_threshold: env_parse("AUTOSAVE_FAILURE_THRESHOLD", DEFAULT_AUTOSAVE_FAILURE_THRESHOLD),
        }
    }
}

// =============================================================================
// SNAPSHOT API CLIENT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Where the snapshot store lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeouts: ApiTimeouts,
}

impl ApiConfig {
    /// Build from environment variables.
    ///
    /// - `SNAPSHOT_API_BASE_URL`: default `http://127.0.0.1:3000`
    /// - `SNAPSHOT_API_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SNAPSHOT_API_CONNECT_TIMEOUT_SECS`: default 10
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("SNAPSHOT_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned());
        Self::with_base_url(base_url)
    }

    /// Use `base_url` with timeouts taken from the environment.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeouts: ApiTimeouts {
                request_secs: env_parse("SNAPSHOT_API_REQUEST_TIMEOUT_SECS", DEFAULT_API_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("SNAPSHOT_API_CONNECT_TIMEOUT_SECS", DEFAULT_API_CONNECT_TIMEOUT_SECS),
            },
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
