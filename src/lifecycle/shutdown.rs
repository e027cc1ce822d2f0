//! Shutdown coordination for the gateway.
//!
//! Startup subscribes the HTTP server before serving. Once a termination
//! signal triggers the coordinator the server stops accepting; requests
//! parked in the legacy throttle or streaming from the delegate still drain.

use tokio::sync::broadcast;

/// One-shot stop notice fanned out to the HTTP server.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a coordinator with no subscribers.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Tell every subscriber to stop. Safe to call with none subscribed.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
