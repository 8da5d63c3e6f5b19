//! Process-wide "save requested" signal.
//!
//! DESIGN
//! ======
//! Any part of the app (keyboard shortcut, command palette, stdin) raises a
//! zero-payload request; every mounted board session listening at that
//! moment receives it. Listeners deregister by being dropped.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

const SAVE_REQUEST_CAPACITY: usize = 16;

#[derive(Clone)]
pub struct SaveRequests {
    tx: broadcast::Sender<()>,
}

impl SaveRequests {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SAVE_REQUEST_CAPACITY);
        Self { tx }
    }

    /// Broadcast a save request. Returns how many listeners received it.
    pub fn request(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> SaveListener {
        SaveListener { rx: self.tx.subscribe() }
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SaveRequests {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SaveListener {
    rx: broadcast::Receiver<()>,
}

impl SaveListener {
    /// Wait for the next request. Returns `None` once every `SaveRequests`
    /// handle is gone.
    pub async fn recv(&mut self) -> Option<()> {
        match self.rx.recv().await {
            Ok(()) => Some(()),
            // EDGE: a burst of requests collapses into one save.
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "save listener lagged; coalescing requests");
                self.rx = self.rx.resubscribe();
                Some(())
            }
            Err(RecvError::Closed) => None,
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
