//! Notification sink for transient save status messages.

use tracing::{info, warn};

/// Receives user-facing save notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Emits notifications as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "snapboard::notify", "{message}");
    }

    fn warning(&self, message: &str) {
        warn!(target: "snapboard::notify", "{message}");
    }
}
