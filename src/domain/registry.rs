//! In-memory Connection Registry.
//!
//! Tracks every live connection and its claimed identity. The room presence
//! view is derived from the same state on demand, so it can never drift from
//! the set of live bindings.
//!
//! The registry is pure state: it performs no I/O, no broadcasting and no
//! persistence. The owner is expected to hold it behind a single
//! `tokio::sync::Mutex` so that concurrent join/leave transitions serialize.

use std::collections::HashMap;

use super::{
    entity::Binding,
    error::RegistryError,
    factory::ConnectionIdFactory,
    value_object::{ConnectionId, RoomName, Timestamp, Username},
};

/// One live transport session and its optional binding.
#[derive(Debug)]
struct ConnectionEntry {
    /// Set once by a successful join; cleared by leave/disconnect
    binding: Option<BoundState>,
}

#[derive(Debug)]
struct BoundState {
    binding: Binding,
    /// Monotonic join sequence, keeps presence listings in join order
    join_seq: u64,
}

/// Registry of live connections and their bindings.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, ConnectionEntry>,
    next_join_seq: u64,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly opened transport session.
    ///
    /// The connection starts unbound; it gains an identity only through
    /// a successful `bind`.
    pub fn register(&mut self) -> ConnectionId {
        let id = ConnectionIdFactory::generate();
        self.entries.insert(id, ConnectionEntry { binding: None });
        id
    }

    /// Atomically check uniqueness and bind (username, room) to a connection.
    ///
    /// The uniqueness check and the insertion happen under the same `&mut`
    /// borrow, so two concurrent joins with the same name serialize on the
    /// owning lock and exactly one of them binds.
    ///
    /// # Errors
    ///
    /// * `RegistryError::UnknownConnection` - the id was never registered
    ///   or has already been removed
    /// * `RegistryError::AlreadyBound` - the connection has joined a room
    /// * `RegistryError::UsernameTaken` - another live connection in the
    ///   room holds a case-insensitively equal username
    pub fn bind(
        &mut self,
        id: ConnectionId,
        username: Username,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Result<Binding, RegistryError> {
        let entry = self
            .entries
            .get(&id)
            .ok_or(RegistryError::UnknownConnection(id))?;
        if entry.binding.is_some() {
            return Err(RegistryError::AlreadyBound(id));
        }

        let taken = self.entries.values().any(|e| {
            e.binding
                .as_ref()
                .is_some_and(|b| b.binding.room == room && b.binding.username.eq_ignore_case(&username))
        });
        if taken {
            return Err(RegistryError::UsernameTaken {
                username: username.into_string(),
                room: room.into_string(),
            });
        }

        let binding = Binding::new(id, username, room, joined_at);
        let join_seq = self.next_join_seq;
        self.next_join_seq += 1;

        // The entry was looked up above, so this cannot miss
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.binding = Some(BoundState {
                binding: binding.clone(),
                join_seq,
            });
        }

        Ok(binding)
    }

    /// Remove the binding of a connection, keeping the connection alive.
    ///
    /// Idempotent: returns `None` when the connection is unknown or was
    /// never bound.
    pub fn unbind(&mut self, id: ConnectionId) -> Option<Binding> {
        self.entries
            .get_mut(&id)
            .and_then(|entry| entry.binding.take())
            .map(|bound| bound.binding)
    }

    /// Destroy the registry entry entirely (transport close).
    ///
    /// Returns the binding the connection held, if any.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Binding> {
        self.entries
            .remove(&id)
            .and_then(|entry| entry.binding)
            .map(|bound| bound.binding)
    }

    /// Look up the binding of a connection
    pub fn lookup(&self, id: ConnectionId) -> Option<Binding> {
        self.entries
            .get(&id)
            .and_then(|entry| entry.binding.as_ref())
            .map(|bound| bound.binding.clone())
    }

    /// Presence snapshot for a room: every live binding whose room matches,
    /// in join order. Recomputed on every call, never cached.
    pub fn members_of(&self, room: &RoomName) -> Vec<Binding> {
        let mut bound: Vec<&BoundState> = self
            .entries
            .values()
            .filter_map(|entry| entry.binding.as_ref())
            .filter(|b| b.binding.room == *room)
            .collect();
        bound.sort_by_key(|b| b.join_seq);
        bound.into_iter().map(|b| b.binding.clone()).collect()
    }

    /// Number of live connections, bound or not
    pub fn connection_count(&self) -> usize {
        self.entries.len()
    }
}
