use std::sync::Arc;

use imhub_core::envelope::Envelope;
use imhub_core::types::is_blank;

use crate::connection::Connection;
use crate::registry::ConnectionRegistry;

/// Result of routing one inbound message.
///
/// None of these are errors to the sending connection; they are reported
/// through logs and returned for callers that want to observe them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Empty or whitespace-only input.
    Ignored,
    /// Not a JSON object.
    Malformed,
    /// `toUserId` missing or blank.
    MissingDestination,
    /// No open connection for the destination.
    DestinationOffline,
    /// Fan-out attempted on every destination connection.
    Delivered { attempted: usize, failed: usize },
}

/// Resolves destinations through the registry and fans messages out.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
}

impl MessageRouter {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Route text received on `sender` to every connection of the
    /// envelope's `toUserId`, stamped with the sender's identity.
    pub fn handle_inbound(&self, sender: &Connection, raw: &str) -> RouteOutcome {
        if is_blank(raw) {
            return RouteOutcome::Ignored;
        }
        tracing::debug!(user_id = %sender.user_id(), message = %raw, "Inbound message");

        let mut envelope = match Envelope::parse(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    user_id = %sender.user_id(),
                    conn_id = %sender.id(),
                    error = %e,
                    "Dropping inbound message"
                );
                return RouteOutcome::Malformed;
            }
        };
        envelope.stamp_sender(sender.user_id());

        let Some(to_user_id) = envelope.destination().map(str::to_owned) else {
            tracing::warn!(user_id = %sender.user_id(), "Inbound message has no destination");
            return RouteOutcome::MissingDestination;
        };

        let text = match envelope.to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode routed envelope");
                return RouteOutcome::Malformed;
            }
        };

        self.fan_out(&to_user_id, &text)
    }

    /// Server-originated send to every connection of `to_user_id`.
    ///
    /// Returns whether the user had at least one connection.
    pub fn broadcast(&self, to_user_id: &str, message: &str) -> bool {
        tracing::info!(to_user_id = %to_user_id, message = %message, "Pushing message");
        if is_blank(to_user_id) {
            tracing::warn!("Push rejected: blank destination");
            return false;
        }
        matches!(
            self.fan_out(to_user_id, message),
            RouteOutcome::Delivered { .. }
        )
    }

    fn fan_out(&self, to_user_id: &str, text: &str) -> RouteOutcome {
        let recipients = self.registry.lookup(to_user_id);
        if recipients.is_empty() {
            tracing::warn!(to_user_id = %to_user_id, "Destination user is not online");
            return RouteOutcome::DestinationOffline;
        }

        let mut failed = 0;
        for connection in &recipients {
            if let Err(e) = connection.send(text) {
                failed += 1;
                tracing::warn!(
                    to_user_id = %to_user_id,
                    conn_id = %connection.id(),
                    error = %e,
                    "Failed to deliver to connection"
                );
            }
        }

        RouteOutcome::Delivered {
            attempted: recipients.len(),
            failed,
        }
    }
}
