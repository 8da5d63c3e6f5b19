//! Board snapshot coordinator: autosave, manual saves, and version history
//! for one open project board.
//!
//! DESIGN
//! ======
//! A `BoardSession` is mounted for a single project id. Mounting fetches the
//! snapshot list, subscribes to the save-request bus, and spawns a driver
//! task that owns the autosave ticker. Each save runs on its own task so a
//! slow store never delays the ticker. Dropping (or closing) the session is
//! the unmount: the driver is aborted, which disarms the ticker and drops the
//! bus listener.
//!
//! CONCURRENCY
//! ===========
//! At most one save is in flight per session. An interval tick that lands
//! during a save is dropped; a manual request is queued (at most one) and
//! replayed as soon as the outstanding save settles. Saves already in flight
//! when the session ends are not cancelled, so every completion checks
//! `alive` before touching session state or the UI store.
//!
//! ERROR HANDLING
//! ==============
//! Store failures never escape to callers. A failed save or refresh is
//! logged and the next tick tries again; there is no retry or backoff. After
//! `failure_threshold` consecutive save failures the notifier receives one
//! warning and the UI store is flagged degraded until the next success.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::events::{SaveListener, SaveRequests};
use super::notify::Notifier;
use super::store::{SnapshotStore, StoreError};
use super::ui::UiStore;
use crate::config::CoordinatorConfig;
use crate::snapshot::{NewSnapshot, SaveReason, Snapshot, SnapshotSummary, now_ms};

/// Version shown before the first snapshot list arrives.
pub const DEFAULT_VERSION: i64 = 1;

const SAVED_MESSAGE: &str = "Board saved";
const DEGRADED_MESSAGE: &str = "Autosave is failing; recent board changes may not be saved";

#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error("project id must not be empty")]
    EmptyProjectId,
    #[error("version {0} is not in the snapshot history")]
    UnknownVersion(i64),
}

/// Supplies the board payload captured by each save.
pub trait BoardSource: Send + Sync {
    fn capture(&self) -> serde_json::Value;
}

/// Board source for sessions that have no canvas attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBoard;

impl BoardSource for EmptyBoard {
    fn capture(&self) -> serde_json::Value {
        serde_json::json!({})
    }
}

/// Collaborators a board session needs from the surrounding app.
#[derive(Clone)]
pub struct BoardDeps {
    pub store: Arc<dyn SnapshotStore>,
    pub notifier: Arc<dyn Notifier>,
    pub ui: UiStore,
    pub requests: SaveRequests,
    pub board: Arc<dyn BoardSource>,
}

/// Result of a single `trigger_save` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The store accepted the snapshot.
    Saved { version: i64 },
    /// The store call failed; the error was logged and swallowed.
    Failed,
    /// Interval tick dropped because another save was in flight.
    Skipped,
    /// Manual request queued behind the in-flight save.
    Queued,
    /// The session ended before the result could be applied.
    Detached,
}

/// Per-session state. Discarded with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub project_id: String,
    pub current_version: i64,
    pub saving: bool,
    pub last_saved_at: Option<i64>,
    /// Most recent first, at most `save_log_capacity` entries.
    pub recent_saves: VecDeque<String>,
    pub snapshots: Vec<SnapshotSummary>,
    pub consecutive_failures: u32,
    pub pending_manual: bool,
}

impl SessionState {
    fn new(project_id: String) -> Self {
        Self {
            project_id,
            current_version: DEFAULT_VERSION,
            saving: false,
            last_saved_at: None,
            recent_saves: VecDeque::new(),
            snapshots: Vec::new(),
            consecutive_failures: 0,
            pending_manual: false,
        }
    }
}

// =============================================================================
// SHARED SESSION CORE
// =============================================================================

struct Shared {
    project_id: String,
    config: CoordinatorConfig,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    ui: UiStore,
    board: Arc<dyn BoardSource>,
    state: Mutex<SessionState>,
    alive: AtomicBool,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Fetch the snapshot list and adopt the store's latest version.
    async fn refresh(&self) -> bool {
        match self.store.list_snapshots(&self.project_id).await {
            Ok(list) => {
                if !self.is_alive() {
                    return false;
                }
                self.apply_list(list);
                true
            }
            Err(e) => {
                warn!(project_id = %self.project_id, error = %e, kind = e.kind(), "snapshot list refresh failed");
                false
            }
        }
    }

    fn apply_list(&self, list: Vec<SnapshotSummary>) {
        let version = {
            let mut state = self.lock();
            if let Some(latest) = list.first() {
                state.current_version = latest.version;
            }
            state.snapshots = list;
            state.current_version
        };
        self.ui.update(|ui| ui.board_version = version);
    }

    async fn trigger_save(&self, reason: SaveReason) -> SaveOutcome {
        if !self.is_alive() {
            return SaveOutcome::Detached;
        }
        {
            let mut state = self.lock();
            if state.saving {
                return match reason {
                    SaveReason::Interval => {
                        debug!(project_id = %self.project_id, "save in flight; dropping interval tick");
                        SaveOutcome::Skipped
                    }
                    SaveReason::Manual => {
                        debug!(project_id = %self.project_id, "save in flight; queueing manual save");
                        state.pending_manual = true;
                        SaveOutcome::Queued
                    }
                };
            }
            state.saving = true;
        }
        let _slot = SavingSlot::claim(self);

        let outcome = self.save_once(reason).await;
        while self.take_pending_manual() {
            self.save_once(SaveReason::Manual).await;
        }
        outcome
    }

    fn take_pending_manual(&self) -> bool {
        if !self.is_alive() {
            return false;
        }
        std::mem::take(&mut self.lock().pending_manual)
    }

    async fn save_once(&self, reason: SaveReason) -> SaveOutcome {
        let body = NewSnapshot::new(reason, now_ms(), self.board.capture());
        match self.store.create_snapshot(&self.project_id, &body).await {
            Ok(created) => {
                if !self.is_alive() {
                    debug!(project_id = %self.project_id, version = created.version, "session ended before save completed");
                    return SaveOutcome::Detached;
                }
                self.record_success(reason, &created);
                self.notifier.success(SAVED_MESSAGE);
                self.refresh().await;
                SaveOutcome::Saved { version: created.version }
            }
            Err(e) => {
                if !self.is_alive() {
                    return SaveOutcome::Detached;
                }
                self.record_failure(reason, &e);
                SaveOutcome::Failed
            }
        }
    }

    fn record_success(&self, reason: SaveReason, created: &Snapshot) {
        let saved_at = now_ms();
        let line = save_log_line(local_now(), reason);
        let recovered = {
            let mut state = self.lock();
            state.last_saved_at = Some(saved_at);
            state.recent_saves.push_front(line);
            state.recent_saves.truncate(self.config.save_log_capacity);
            state.current_version = created.version;
            let recovered = self.config.failure_threshold > 0 && state.consecutive_failures >= self.config.failure_threshold;
            state.consecutive_failures = 0;
            recovered
        };
        self.ui.update(|ui| {
            ui.board_last_saved_at = Some(saved_at);
            ui.board_version = created.version;
            ui.board_save_degraded = false;
        });
        info!(project_id = %self.project_id, version = created.version, %reason, "board saved");
        if recovered {
            info!(project_id = %self.project_id, "autosave recovered");
        }
    }

    fn record_failure(&self, reason: SaveReason, err: &StoreError) {
        let streak = {
            let mut state = self.lock();
            state.consecutive_failures = state.consecutive_failures.saturating_add(1);
            state.consecutive_failures
        };
        warn!(
            project_id = %self.project_id,
            %reason,
            error = %err,
            kind = err.kind(),
            streak,
            "board save failed"
        );
        if self.config.failure_threshold > 0 && streak == self.config.failure_threshold {
            self.notifier.warning(DEGRADED_MESSAGE);
            self.ui.update(|ui| ui.board_save_degraded = true);
        }
    }
}

/// Holds the single save slot; releasing it on drop clears `saving` even if
/// the save future is cancelled mid-flight.
struct SavingSlot<'a> {
    shared: &'a Shared,
}

impl<'a> SavingSlot<'a> {
    fn claim(shared: &'a Shared) -> Self {
        if shared.is_alive() {
            shared.ui.update(|ui| ui.board_saving = true);
        }
        Self { shared }
    }
}

impl Drop for SavingSlot<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.shared.lock();
            state.saving = false;
            state.pending_manual = false;
        }
        if self.shared.is_alive() {
            self.shared.ui.update(|ui| ui.board_saving = false);
        }
    }
}

fn spawn_save(shared: &Arc<Shared>, reason: SaveReason) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        shared.trigger_save(reason).await;
    });
}

async fn drive(shared: Arc<Shared>, mut listener: SaveListener) {
    let period = shared.config.autosave_interval;
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut listening = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => spawn_save(&shared, SaveReason::Interval),
            received = listener.recv(), if listening => {
                if received.is_some() {
                    spawn_save(&shared, SaveReason::Manual);
                } else {
                    debug!(project_id = %shared.project_id, "save request bus closed");
                    listening = false;
                }
            }
        }
    }
}

// =============================================================================
// BOARD SESSION
// =============================================================================

/// One mounted board. Dropping it ends the session.
pub struct BoardSession {
    shared: Arc<Shared>,
    driver: JoinHandle<()>,
}

impl BoardSession {
    /// Mount a session for `project_id`: fetch the snapshot list, arm the
    /// autosave ticker, and subscribe to save requests.
    ///
    /// A failed initial fetch is not an error; the session starts at
    /// version 1.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::EmptyProjectId`] for a blank project id.
    pub async fn start(
        project_id: impl Into<String>,
        config: CoordinatorConfig,
        deps: BoardDeps,
    ) -> Result<Self, CoordinatorError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(CoordinatorError::EmptyProjectId);
        }

        let listener = deps.requests.subscribe();
        let shared = Arc::new(Shared {
            state: Mutex::new(SessionState::new(project_id.clone())),
            project_id,
            config,
            store: deps.store,
            notifier: deps.notifier,
            ui: deps.ui,
            board: deps.board,
            alive: AtomicBool::new(true),
        });
        shared.ui.update(|ui| {
            ui.board_saving = false;
            ui.board_last_saved_at = None;
            ui.board_version = DEFAULT_VERSION;
            ui.board_save_degraded = false;
        });

        shared.refresh().await;
        let driver = tokio::spawn(drive(Arc::clone(&shared), listener));
        info!(
            project_id = %shared.project_id,
            interval_ms = u64::try_from(config.autosave_interval.as_millis()).unwrap_or(u64::MAX),
            "board session started"
        );
        Ok(Self { shared, driver })
    }

    #[must_use]
    pub fn project_id(&self) -> &str {
        &self.shared.project_id
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.shared.lock().clone()
    }

    #[must_use]
    pub fn current_version(&self) -> i64 {
        self.shared.lock().current_version
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.shared.lock().saving
    }

    #[must_use]
    pub fn recent_saves(&self) -> Vec<String> {
        self.shared.lock().recent_saves.iter().cloned().collect()
    }

    /// Snapshots known to the version selector, most recent first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<SnapshotSummary> {
        self.shared.lock().snapshots.clone()
    }

    /// Save now. Never fails; see [`SaveOutcome`] for what happened.
    pub async fn trigger_save(&self, reason: SaveReason) -> SaveOutcome {
        self.shared.trigger_save(reason).await
    }

    /// Re-fetch the snapshot list. Returns whether the fetch succeeded.
    pub async fn refresh(&self) -> bool {
        self.shared.refresh().await
    }

    /// Show `version` in the selector. Display only: the snapshot payload is
    /// not fetched or applied.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::UnknownVersion`] if `version` is not in the
    /// last fetched snapshot list.
    pub fn select_version(&self, version: i64) -> Result<(), CoordinatorError> {
        {
            let mut state = self.shared.lock();
            if !state.snapshots.iter().any(|s| s.version == version) {
                return Err(CoordinatorError::UnknownVersion(version));
            }
            state.current_version = version;
        }
        self.shared.ui.update(|ui| ui.board_version = version);
        Ok(())
    }

    /// End the session and wait for the driver to stop.
    pub async fn close(mut self) {
        self.teardown();
        let _ = (&mut self.driver).await;
        info!(project_id = %self.shared.project_id, "board session closed");
    }

    fn teardown(&mut self) {
        if !self.shared.alive.swap(false, Ordering::AcqRel) {
            return;
        }
        self.driver.abort();
        self.shared.ui.update(|ui| ui.board_saving = false);
    }
}

impl Drop for BoardSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// SAVE LOG
// =============================================================================

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `HH:MM:SS (reason)` entry for the recent-save log.
fn save_log_line(at: OffsetDateTime, reason: SaveReason) -> String {
    format!("{:02}:{:02}:{:02} ({reason})", at.hour(), at.minute(), at.second())
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
