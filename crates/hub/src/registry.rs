use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use imhub_core::types::{ConnectionId, UserId};

use crate::connection::Connection;
use crate::presence::PresenceCounter;

/// Membership token returned by [`ConnectionRegistry::register`].
///
/// The registry owns the membership; the token is the only way to end it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    user_id: UserId,
    connection_id: ConnectionId,
}

impl Registration {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }
}

/// Concurrent map from user id to that user's open connections.
///
/// A user key exists only while its set is non-empty. The presence counter
/// changes while the shard lock for that user is still held, so routing and
/// presence never disagree about who is online. Distinct users hash to
/// independent shards.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    users: DashMap<UserId, HashMap<ConnectionId, Arc<Connection>>>,
    presence: PresenceCounter,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection under its own user id.
    pub fn register(&self, connection: Arc<Connection>) -> Registration {
        let registration = Registration {
            user_id: connection.user_id().to_string(),
            connection_id: connection.id(),
        };

        let mut set = self.users.entry(registration.user_id.clone()).or_default();
        let first = set.is_empty();
        set.insert(registration.connection_id, connection);
        if first {
            self.presence.increment();
        }
        let connections = set.len();
        drop(set);

        tracing::debug!(
            user_id = %registration.user_id,
            conn_id = %registration.connection_id,
            connections,
            "Connection registered"
        );
        registration
    }

    /// Remove a membership. Returns `false` if it was already gone.
    pub fn unregister(&self, registration: &Registration) -> bool {
        let removed = match self.users.entry(registration.user_id.clone()) {
            Entry::Occupied(mut set) => {
                let removed = set
                    .get_mut()
                    .remove(&registration.connection_id)
                    .is_some();
                if set.get().is_empty() {
                    set.remove();
                    self.presence.decrement();
                }
                removed
            }
            Entry::Vacant(_) => false,
        };

        if removed {
            tracing::debug!(
                user_id = %registration.user_id,
                conn_id = %registration.connection_id,
                "Connection unregistered"
            );
        }
        removed
    }

    /// Snapshot of the user's open connections; empty if none.
    pub fn lookup(&self, user_id: &str) -> Vec<Arc<Connection>> {
        self.users
            .get(user_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Distinct users with at least one connection.
    pub fn online_count(&self) -> usize {
        self.presence.get()
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    pub fn user_connection_count(&self, user_id: &str) -> usize {
        self.users.get(user_id).map(|set| set.len()).unwrap_or(0)
    }

    /// Total open connections across all users.
    pub fn connection_count(&self) -> usize {
        self.users.iter().map(|entry| entry.value().len()).sum()
    }

    /// Close and drop every connection. Returns how many were closed.
    ///
    /// Used during graceful shutdown; presence returns to zero.
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        self.users.retain(|_, set| {
            for connection in set.values() {
                connection.close();
            }
            closed += set.len();
            self.presence.decrement();
            false
        });
        closed
    }
}
