use dashmap::DashMap;
use tokio::sync::oneshot;

use webshell_core::protocol::message::Message;

/// Correlation id -> waiting native caller, for calls issued toward the web side.
///
/// Every entry is removed exactly once: by the first matching response, or by
/// the [`PendingGuard`] of the caller that gave up (timeout or drop).
#[derive(Default)]
pub struct PendingCalls {
    calls: DashMap<String, oneshot::Sender<Message>>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self {
            calls: DashMap::new(),
        }
    }

    /// Open an entry for `id`. The returned guard removes it when dropped.
    pub fn register(&self, id: String) -> (PendingGuard<'_>, oneshot::Receiver<Message>) {
        let (tx, rx) = oneshot::channel();
        self.calls.insert(id.clone(), tx);
        (PendingGuard { table: self, id }, rx)
    }

    /// Hand `msg` to the caller waiting on its id. Returns false when nobody
    /// waits (unknown, duplicate, or late response); such messages are dropped.
    pub fn resolve(&self, msg: Message) -> bool {
        if msg.id.is_empty() {
            return false;
        }
        let Some((id, tx)) = self.calls.remove(&msg.id) else {
            tracing::debug!(id = %msg.id, "response without pending call dropped");
            return false;
        };
        if tx.send(msg).is_err() {
            tracing::debug!(%id, "pending caller already gone");
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Removes its pending entry on drop if no response claimed it first.
pub struct PendingGuard<'a> {
    table: &'a PendingCalls,
    id: String,
}

impl PendingGuard<'_> {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.table.calls.remove(&self.id);
    }
}
