use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use roomrelay_core::error::SendFailure;

/// One session's outbound queue sender.
///
/// The session task owns the socket; this handle only enqueues frames for it.
#[derive(Clone, Debug)]
pub struct Connection {
    tx: mpsc::Sender<Message>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Handle plus the receiving end of a fresh bounded queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// The session task is still draining this queue.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Enqueue without waiting. Never blocks the caller.
    pub fn send(&self, msg: Message) -> Result<(), SendFailure> {
        self.tx.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => SendFailure::Full,
            TrySendError::Closed(_) => SendFailure::Closed,
        })
    }
}

/// Connection registry: `conn_id -> Connection`.
///
/// Sharded, so register/unregister from independent sessions never need an
/// outer lock. Broadcasts iterate [`ConnectionRegistry::snapshot`], which
/// holds no shard guard once it returns.
#[derive(Default)]
pub struct ConnectionRegistry {
    conns: DashMap<String, Connection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            conns: DashMap::new(),
        }
    }

    /// Insert or overwrite. Returns the handle that was replaced, if any.
    pub fn register(&self, id: impl Into<String>, conn: Connection) -> Option<Connection> {
        self.conns.insert(id.into(), conn)
    }

    /// Remove if present. Absent ids are a no-op.
    pub fn unregister(&self, id: &str) -> Option<Connection> {
        self.conns.remove(id).map(|(_, conn)| conn)
    }

    pub fn get(&self, id: &str) -> Option<Connection> {
        self.conns.get(id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conns.contains_key(id)
    }

    /// Point-in-time copy of every entry.
    pub fn snapshot(&self) -> Vec<(String, Connection)> {
        self.conns
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.conns.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.conns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conns.is_empty()
    }
}
