use crate::network::Connection;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// The node's set of live connections.
///
/// No identity beyond the connection itself: dialling the same address twice
/// yields two independent entries.
pub struct Peers {
    inner: RwLock<Vec<Arc<Connection>>>,
}

impl Default for Peers {
    fn default() -> Self {
        Self::new()
    }
}

impl Peers {
    pub fn new() -> Peers {
        Peers {
            inner: RwLock::new(vec![]),
        }
    }

    pub fn add(&self, connection: Arc<Connection>) {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        if !inner.iter().any(|c| c.id() == connection.id()) {
            inner.push(connection);
        }
    }

    /// Remove by id, returning the evicted connection if it was present
    pub fn evict(&self, id: Uuid) -> Option<Arc<Connection>> {
        let mut inner = self
            .inner
            .write()
            .expect("Failed to acquire write lock on peers - this should never happen");
        let idx = inner.iter().position(|c| c.id() == id)?;
        Some(inner.remove(idx))
    }

    /// Snapshot for iteration outside the lock
    pub fn get_connections(&self) -> Vec<Arc<Connection>> {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .to_vec()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .iter()
            .any(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .expect("Failed to acquire read lock on peers - this should never happen")
            .is_empty()
    }
}
