//! Connection registry and best-effort broadcast.

use crate::frame::Frame;
use std::collections::HashMap;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identifier for one accepted WebSocket connection.
pub type ConnectionId = Uuid;

/// Tracks the currently open connections.
///
/// Each entry maps a connection id to the sending half of that
/// connection's outbound frame queue. The lock is held only for map
/// mutation, never across I/O. The registry size is always the number of
/// open, un-closed connections: entries are added on upgrade and removed
/// on read error, close, or failed write.
#[derive(Default)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, mpsc::Sender<Frame>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outbound queue.
    pub async fn add(&self, id: ConnectionId, outbound: mpsc::Sender<Frame>) {
        self.connections.write().await.insert(id, outbound);
    }

    /// Deregister a connection. Returns whether it was present.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        self.connections.write().await.remove(&id).is_some()
    }

    /// Number of currently open connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether no connections are open.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Send a frame to every open connection.
    ///
    /// Nothing in the chat flow feeds this today; it is the hook for
    /// future multi-client fan-out. A failed send removes the offending
    /// connection and does not stop delivery to the others. Returns the
    /// number of connections the frame reached.
    pub async fn broadcast(&self, frame: Frame) -> usize {
        let targets: Vec<(ConnectionId, mpsc::Sender<Frame>)> = self
            .connections
            .read()
            .await
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, outbound) in targets {
            if outbound.send(frame.clone()).await.is_ok() {
                delivered += 1;
            } else {
                warn!("broadcast write failed, dropping connection {}", id);
                dead.push(id);
            }
        }

        if !dead.is_empty() {
            let mut connections = self.connections.write().await;
            for id in dead {
                connections.remove(&id);
            }
        }

        debug!("broadcast reached {} connections", delivered);
        delivered
    }
}
