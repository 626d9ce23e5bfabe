use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use imhub_core::error::SendError;
use imhub_core::types::{ConnectionId, Timestamp, UserId};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Receiving half of a connection's outbound queue.
///
/// The transport owns it and writes every frame to the socket in the order
/// it was enqueued.
pub type OutboundReceiver = mpsc::UnboundedReceiver<String>;

/// One logical bidirectional channel owned by a single user.
///
/// Sends only enqueue text onto an unbounded channel, so they never wait
/// on network I/O. `open` flips from `true` to `false` exactly once.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    sender: mpsc::UnboundedSender<String>,
    open: AtomicBool,
    /// Cancelled on close; heartbeat and transport tasks watch it.
    closed: CancellationToken,
    connected_at: Timestamp,
}

impl Connection {
    /// Create an open connection for `user_id` and the receiver the
    /// transport drains.
    pub fn open(user_id: impl Into<UserId>) -> (Arc<Self>, OutboundReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let connection = Arc::new(Self {
            id: ConnectionId::new(),
            user_id: user_id.into(),
            sender,
            open: AtomicBool::new(true),
            closed: CancellationToken::new(),
            connected_at: chrono::Utc::now(),
        });
        (connection, receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    /// `false` once closed, or once the transport dropped its receiver.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    /// Enqueue a text frame for asynchronous transmission.
    pub fn send(&self, text: impl Into<String>) -> Result<(), SendError> {
        if !self.is_open() {
            return Err(SendError::Closed(self.id));
        }
        self.sender
            .send(text.into())
            .map_err(|_| SendError::Closed(self.id))
    }

    /// Close the connection. Returns `true` only for the call that closed it.
    ///
    /// Cancels every task watching [`closed`](Self::closed), which includes
    /// the heartbeat monitor and the transport writer.
    pub fn close(&self) -> bool {
        if self.open.swap(false, Ordering::AcqRel) {
            self.closed.cancel();
            true
        } else {
            false
        }
    }

    /// Resolves once [`close`](Self::close) has been called.
    pub async fn closed(&self) {
        self.closed.cancelled().await;
    }

    /// Token cancelled when this connection closes.
    pub fn close_token(&self) -> &CancellationToken {
        &self.closed
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn send_enqueues_in_order() {
        let (conn, mut rx) = Connection::open("u1");

        conn.send("one").unwrap();
        conn.send("two").unwrap();

        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
    }

    #[test]
    fn send_after_close_fails_with_closed() {
        let (conn, _rx) = Connection::open("u1");

        assert!(conn.close());
        assert!(!conn.is_open());
        assert_matches!(conn.send("late"), Err(SendError::Closed(id)) if id == conn.id());
    }

    #[test]
    fn close_is_idempotent() {
        let (conn, _rx) = Connection::open("u1");

        assert!(conn.close());
        assert!(!conn.close());
        assert!(conn.close_token().is_cancelled());
    }

    #[test]
    fn dropped_receiver_reads_as_closed() {
        let (conn, rx) = Connection::open("u1");
        drop(rx);

        assert!(!conn.is_open());
        assert!(conn.send("nobody listening").is_err());
    }

    #[tokio::test]
    async fn closed_resolves_after_close() {
        let (conn, _rx) = Connection::open("u1");
        let waiter = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.closed().await })
        };

        conn.close();
        waiter.await.unwrap();
    }
}
