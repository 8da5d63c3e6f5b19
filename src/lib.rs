//! Board snapshot history and autosave coordination.
//!
//! ARCHITECTURE
//! ============
//! - `snapshot`: wire types shared by both sides.
//! - `client`: the per-board autosave coordinator plus store clients, the
//!   save-request bus, notifications, and shared UI state.
//! - `server`: the HTTP snapshot store backed by Postgres.
//! - `config`: environment-driven tuning.

pub mod client;
pub mod config;
pub mod server;
pub mod snapshot;
