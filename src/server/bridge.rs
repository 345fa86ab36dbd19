// src/server/bridge.rs

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Message pushed to connected browsers.
///
/// Serialized as `{"kind":"reload"}` or
/// `{"kind":"css","path":"/styles/main.css"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Reload the whole page.
    Reload,
    /// Swap the stylesheet at `path` without reloading.
    Css { path: String },
}

/// Fan-out of reload signals to every connected client.
///
/// Each websocket connection holds its own subscription. A client only sees
/// messages sent after it subscribed; nothing is replayed.
#[derive(Debug, Clone)]
pub struct ReloadBridge {
    tx: broadcast::Sender<ReloadMessage>,
}

impl Default for ReloadBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl ReloadBridge {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.tx.subscribe()
    }

    /// Number of clients that would receive a message sent now.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Ask every connected client to reload. Returns how many were reached.
    pub fn notify_reload(&self) -> usize {
        self.send(ReloadMessage::Reload)
    }

    /// Push a freshly written stylesheet. Returns how many clients were reached.
    pub fn push_css(&self, path: impl Into<String>) -> usize {
        self.send(ReloadMessage::Css { path: path.into() })
    }

    fn send(&self, message: ReloadMessage) -> usize {
        match self.tx.send(message) {
            Ok(n) => n,
            Err(_) => {
                debug!("no reload clients connected");
                0
            }
        }
    }
}
