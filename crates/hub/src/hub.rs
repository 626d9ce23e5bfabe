//! Connection lifecycle glue between the transport and the hub core.
//!
//! The transport calls [`Hub::open`] once per accepted connection, then
//! forwards the connection's events to the returned [`Session`]. Closing,
//! erroring, or dropping a session all end its registry membership.

use std::fmt;
use std::sync::Arc;

use imhub_core::error::CoreError;
use imhub_core::types::is_blank;

use crate::config::HubConfig;
use crate::connection::{Connection, OutboundReceiver};
use crate::heartbeat::HeartbeatMonitor;
use crate::registry::{ConnectionRegistry, Registration};
use crate::router::{MessageRouter, RouteOutcome};

/// Process-wide hub. Built once at server start and shared via `Arc`.
pub struct Hub {
    config: HubConfig,
    registry: Arc<ConnectionRegistry>,
    router: MessageRouter,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let router = MessageRouter::new(Arc::clone(&registry));
        Self {
            config,
            registry,
            router,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    /// Accept a new connection for `user_id`.
    ///
    /// Registers it, sends the welcome text, and starts its heartbeat.
    /// The returned receiver must be drained by the transport writer.
    /// Must be called from within a tokio runtime.
    pub fn open(&self, user_id: &str) -> Result<(Session, OutboundReceiver), CoreError> {
        if is_blank(user_id) {
            return Err(CoreError::Validation("user id must not be blank".into()));
        }

        let (connection, outbound) = Connection::open(user_id);
        let registration = self.registry.register(Arc::clone(&connection));
        tracing::info!(
            user_id = %user_id,
            conn_id = %connection.id(),
            online = self.registry.online_count(),
            "User connected"
        );

        if let Err(e) = connection.send(self.config.welcome_text.as_str()) {
            tracing::error!(user_id = %user_id, error = %e, "Failed to send connection confirmation");
        }

        let mut heartbeat =
            HeartbeatMonitor::new(Arc::clone(&connection), self.config.heartbeat_interval);
        heartbeat.start();

        let session = Session {
            connection,
            registration,
            heartbeat,
            registry: Arc::clone(&self.registry),
            router: self.router.clone(),
        };
        Ok((session, outbound))
    }

    /// Push server-originated text to every connection of `user_id`.
    ///
    /// Returns whether the user was online.
    pub fn push_to_user(&self, user_id: &str, message: &str) -> bool {
        self.router.broadcast(user_id, message)
    }

    pub fn online_count(&self) -> usize {
        self.registry.online_count()
    }

    /// Close every open connection. Returns how many were closed.
    pub fn shutdown(&self) -> usize {
        let closed = self.registry.close_all();
        tracing::info!(closed, "Closed all hub connections");
        closed
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

/// Per-connection handle held by the transport task.
pub struct Session {
    connection: Arc<Connection>,
    registration: Registration,
    heartbeat: HeartbeatMonitor,
    registry: Arc<ConnectionRegistry>,
    router: MessageRouter,
}

impl Session {
    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn user_id(&self) -> &str {
        self.connection.user_id()
    }

    pub fn heartbeat(&self) -> &HeartbeatMonitor {
        &self.heartbeat
    }

    /// Text frame received from the client.
    pub fn on_message(&self, raw: &str) -> RouteOutcome {
        self.router.handle_inbound(&self.connection, raw)
    }

    /// Transport reported an error. De-registers immediately; a later
    /// close event is harmless.
    pub fn on_error(&mut self, cause: &dyn fmt::Display) {
        tracing::error!(user_id = %self.user_id(), error = %cause, "Connection error");
        self.teardown();
    }

    /// Transport reported the connection closed.
    pub fn on_close(&mut self) {
        self.teardown();
    }

    /// Resolves when the hub side closes the connection (failed heartbeat
    /// or shutdown), so the transport can stop reading.
    pub async fn closed(&self) {
        self.connection.closed().await;
    }

    fn teardown(&mut self) {
        self.heartbeat.stop();
        self.connection.close();
        if self.registry.unregister(&self.registration) {
            tracing::info!(
                user_id = %self.user_id(),
                conn_id = %self.connection.id(),
                online = self.registry.online_count(),
                "User disconnected"
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
