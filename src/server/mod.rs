//! Snapshot store server.
//!
//! ARCHITECTURE
//! ============
//! `routes` translates HTTP to service calls, `services` owns the SQL, and
//! `state` carries the pool into handlers.

pub mod db;
pub mod routes;
pub mod services;
pub mod state;

use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("listener failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect to Postgres, apply migrations, and serve until the listener fails.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// port cannot be bound.
pub async fn serve(database_url: &str, port: u16) -> Result<(), ServerError> {
    let pool = db::init_pool(database_url).await?;
    let state = state::AppState::new(pool);
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    info!(%port, "snapshot store listening");
    axum::serve(listener, app).await?;
    Ok(())
}
