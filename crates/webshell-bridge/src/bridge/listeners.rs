use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Native callback for events sent by the web side.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Handle returned by `on`, used to remove a single listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event name -> ordered native listeners.
pub struct EventListeners {
    map: DashMap<String, Vec<(ListenerId, Listener)>>,
    seq: AtomicU64,
}

impl Default for EventListeners {
    fn default() -> Self {
        Self::new()
    }
}

impl EventListeners {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn on(&self, event: &str, listener: Listener) -> ListenerId {
        let id = ListenerId(self.seq.fetch_add(1, Ordering::Relaxed));
        self.map
            .entry(event.to_string())
            .or_insert_with(Vec::new)
            .push((id, listener));
        id
    }

    /// Remove one listener, or every listener of `event` when `id` is `None`.
    /// Returns whether anything was removed.
    pub fn off(&self, event: &str, id: Option<ListenerId>) -> bool {
        let Some(id) = id else {
            return self.map.remove(event).is_some();
        };
        let Some(mut list) = self.map.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(lid, _)| *lid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            drop(list);
            self.map.remove_if(event, |_, l| l.is_empty());
        }
        removed
    }

    /// Invoke every listener of `event` in registration order. A panicking
    /// listener is logged and skipped. Returns how many listeners ran cleanly.
    pub fn dispatch(&self, event: &str, data: &Value) -> usize {
        // snapshot so listeners may call on/off without deadlocking
        let listeners: Vec<Listener> = match self.map.get(event) {
            Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return 0,
        };

        let mut ok = 0;
        for listener in listeners {
            match catch_unwind(AssertUnwindSafe(|| listener(data))) {
                Ok(()) => ok += 1,
                Err(_) => tracing::warn!(%event, "event listener panicked"),
            }
        }
        ok
    }
}
