use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of distinct users with at least one open connection.
///
/// Only [`ConnectionRegistry`](crate::ConnectionRegistry) mutates it, from
/// inside the same critical section that changes a user's connection set.
/// Reads never block.
#[derive(Debug, Default)]
pub struct PresenceCounter(AtomicUsize);

impl PresenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a user going from zero to one connection. Returns the new value.
    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a user going from one to zero connections. Returns the new value.
    ///
    /// Saturates at zero.
    pub fn decrement(&self) -> usize {
        match self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        {
            Ok(previous) => previous - 1,
            Err(_) => {
                tracing::warn!("Presence counter decremented below zero, ignoring");
                0
            }
        }
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
