//! Shared server state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Snapshots live only in Postgres, so the pool is all handlers need.

use sqlx::PgPool;

use crate::config::env_parse;

const DEFAULT_SNAPSHOT_CREATE_RETRIES: usize = 3;

/// Shared application state. Clone is required by Axum; the pool is
/// reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Attempts at allocating a version before a create gives up.
    pub create_retries: usize,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool, create_retries: env_parse("SNAPSHOT_CREATE_RETRIES", DEFAULT_SNAPSHOT_CREATE_RETRIES).max(1) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
