//! Connected page sessions, and the evaluator that broadcasts to them.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use webshell_core::error::{BridgeError, Result};

use crate::eval::Evaluator;

/// One session's outbound queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

/// session id -> outbound queue.
pub struct SessionHub {
    sessions: DashMap<u64, Connection>,
    seq: AtomicU64,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn insert(&self, conn: Connection) -> u64 {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(id, conn);
        id
    }

    pub fn remove(&self, id: u64) -> Option<Connection> {
        self.sessions.remove(&id).map(|(_, c)| c)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Lossy broadcast: `try_send` to every page, dropping where a queue is full.
/// Fails only when no page received the script.
impl Evaluator for SessionHub {
    fn eval(&self, script: &str) -> Result<()> {
        let mut delivered = 0usize;
        for conn in self.sessions.iter() {
            if conn.tx.try_send(Message::Text(script.to_string())).is_ok() {
                delivered += 1;
            }
        }
        if delivered == 0 {
            return Err(BridgeError::Eval("no connected page accepted the script".into()));
        }
        Ok(())
    }
}
