//! Progress notifiers: best-effort push of live cook status
//!
//! Notifier failures must never affect orchestration correctness. The
//! orchestrator logs and swallows every error from this boundary.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use super::events::CookEvent;

/// Push channel to interested observers
#[async_trait]
pub trait ProgressNotifier: Send + Sync {
    /// Broadcast one event. Errors are logged and swallowed by the caller.
    async fn notify(&self, event: &CookEvent) -> Result<()>;
}

/// Notifier that drops every event
pub struct NullNotifier;

#[async_trait]
impl ProgressNotifier for NullNotifier {
    async fn notify(&self, _event: &CookEvent) -> Result<()> {
        Ok(())
    }
}

/// In-process fan-out over a tokio broadcast channel.
///
/// Subscribers that fall behind lose the oldest events; that is acceptable
/// because events are display-only and status can always be re-derived.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<CookEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<CookEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl ProgressNotifier for BroadcastNotifier {
    async fn notify(&self, event: &CookEvent) -> Result<()> {
        // A send with no live receivers is not a failure; observers are
        // optional.
        let _ = self.sender.send(event.clone());
        Ok(())
    }
}

/// Notify without letting the notifier influence the outcome
pub(crate) async fn notify_best_effort(notifier: &dyn ProgressNotifier, event: &CookEvent) {
    if let Err(err) = notifier.notify(event).await {
        warn!(collection_id = event.collection_id(), %err, "progress notifier failed");
    }
}
