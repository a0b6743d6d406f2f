//! Broadcast Router: fan-out of server events to live connections.
//!
//! The router owns the per-connection outbound channels. Recipient sets for
//! room-wide broadcasts are snapshotted from the Connection Registry under
//! its lock; the lock is released before any frame is pushed, so registry
//! contention does not scale with room size.
//!
//! Delivery is best-effort and fire-and-forget: a connection that is
//! mid-teardown simply does not receive the event, and partial delivery
//! failure is never surfaced to the caller.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ConnectionId, ConnectionRegistry, RoomName},
    infrastructure::dto::websocket::ServerEvent,
};

/// Fan-out router over the live connections' outbound channels.
pub struct BroadcastRouter {
    registry: Arc<Mutex<ConnectionRegistry>>,
    senders: Mutex<HashMap<ConnectionId, mpsc::UnboundedSender<String>>>,
}

impl BroadcastRouter {
    /// Create a router over the given registry
    pub fn new(registry: Arc<Mutex<ConnectionRegistry>>) -> Self {
        Self {
            registry,
            senders: Mutex::new(HashMap::new()),
        }
    }

    /// Attach the outbound channel of a newly opened connection
    pub async fn attach(&self, id: ConnectionId, sender: mpsc::UnboundedSender<String>) {
        let mut senders = self.senders.lock().await;
        senders.insert(id, sender);
    }

    /// Detach a connection's outbound channel (transport close)
    pub async fn detach(&self, id: ConnectionId) {
        let mut senders = self.senders.lock().await;
        senders.remove(&id);
    }

    /// Deliver an event to a single connection (welcome, history, acks)
    pub async fn to_connection(&self, id: ConnectionId, event: &ServerEvent) {
        let Some(payload) = encode(event) else {
            return;
        };
        self.deliver(&[id], &payload).await;
    }

    /// Deliver an event to every connection bound to a room
    pub async fn to_room(&self, room: &RoomName, event: &ServerEvent) {
        let recipients = self.room_recipients(room, None).await;
        let Some(payload) = encode(event) else {
            return;
        };
        self.deliver(&recipients, &payload).await;
    }

    /// Deliver an event to every connection bound to a room except one
    pub async fn to_room_except(
        &self,
        room: &RoomName,
        exclude: ConnectionId,
        event: &ServerEvent,
    ) {
        let recipients = self.room_recipients(room, Some(exclude)).await;
        let Some(payload) = encode(event) else {
            return;
        };
        self.deliver(&recipients, &payload).await;
    }

    /// Snapshot the recipient set under the registry lock, then release it
    async fn room_recipients(
        &self,
        room: &RoomName,
        exclude: Option<ConnectionId>,
    ) -> Vec<ConnectionId> {
        let registry = self.registry.lock().await;
        registry
            .members_of(room)
            .iter()
            .map(|binding| binding.connection_id)
            .filter(|id| Some(*id) != exclude)
            .collect()
    }

    /// Push an already-serialized frame onto each recipient's channel
    async fn deliver(&self, recipients: &[ConnectionId], payload: &str) {
        let senders = self.senders.lock().await;
        for id in recipients {
            match senders.get(id) {
                Some(sender) => {
                    if sender.send(payload.to_string()).is_err() {
                        tracing::warn!("Failed to send event to connection '{}'", id);
                    }
                }
                None => {
                    // Connection is mid-teardown; skip without error
                    tracing::debug!("No outbound channel for connection '{}', skipped", id);
                }
            }
        }
    }
}

/// Serialize an event once per broadcast
fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!("Failed to serialize server event: {}", e);
            None
        }
    }
}
