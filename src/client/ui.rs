//! Shared UI state with change subscriptions.
//!
//! DESIGN
//! ======
//! `UiStore` is a cloneable context handle passed to whatever needs UI state.
//! Writers go through `update`, which notifies subscribers only when a field
//! actually changed. Board indicators (`board_*`) are written by the board
//! coordinator and read by status chrome.

use std::sync::Arc;

use tokio::sync::watch;

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// Snapshot of the UI state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UiState {
    pub sidebar_open: bool,
    pub assistant_open: bool,
    pub command_open: bool,
    pub new_project_open: bool,
    pub notifications_open: bool,
    pub search_query: String,
    pub view_mode: ViewMode,
    pub role: Role,
    /// True while a board save request is in flight.
    pub board_saving: bool,
    /// Epoch millis of the last successful board save.
    pub board_last_saved_at: Option<i64>,
    /// Board version shown in the version selector.
    pub board_version: i64,
    /// Set after repeated autosave failures, cleared by the next success.
    pub board_save_degraded: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            assistant_open: false,
            command_open: false,
            new_project_open: false,
            notifications_open: false,
            search_query: String::new(),
            view_mode: ViewMode::Grid,
            role: Role::Owner,
            board_saving: false,
            board_last_saved_at: None,
            board_version: 1,
            board_save_degraded: false,
        }
    }
}

/// Project list layout on the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Workspace role shown in the header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    #[default]
    Owner,
    Researcher,
    Viewer,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Clone)]
pub struct UiStore {
    tx: Arc<watch::Sender<UiState>>,
}

impl UiStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_state(UiState::default())
    }

    #[must_use]
    pub fn with_state(state: UiState) -> Self {
        let (tx, _) = watch::channel(state);
        Self { tx: Arc::new(tx) }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn get(&self) -> UiState {
        self.tx.borrow().clone()
    }

    /// Apply `f` and notify subscribers if the state changed. Returns whether
    /// anything changed.
    pub fn update(&self, f: impl FnOnce(&mut UiState)) -> bool {
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        })
    }

    /// Receiver that observes every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.tx.subscribe()
    }
}

impl Default for UiStore {
    fn default() -> Self {
        Self::new()
    }
}
