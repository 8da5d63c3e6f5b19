//! Board-side modules: the snapshot coordinator and its collaborators.
//!
//! DESIGN
//! ======
//! The coordinator only depends on traits (`SnapshotStore`, `Notifier`,
//! `BoardSource`) and two context handles (`UiStore`, `SaveRequests`), so
//! the app wires in HTTP or in-memory stores without touching session logic.

pub mod api;
pub mod coordinator;
pub mod events;
pub mod memory;
pub mod notify;
pub mod store;
pub mod ui;

pub use coordinator::{BoardDeps, BoardSession, BoardSource, CoordinatorError, EmptyBoard, SaveOutcome, SessionState};
pub use store::{SnapshotStore, StoreError};
