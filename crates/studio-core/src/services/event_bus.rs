//! Session lifecycle notifications
//!
//! The client never navigates anywhere itself; hosts subscribe here and decide
//! what an expired session means for their UI.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    LoggedIn,
    LoggedOut,
    /// The backend rejected the stored token; local tokens are already gone.
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Session event {:?} dropped (no subscribers): {}", event, e);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new(16)
    }
}
