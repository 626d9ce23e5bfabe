use crate::types::ConnectionId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure to enqueue an outbound frame on a single connection.
///
/// Always contained at that connection; callers log it and move on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Connection {0} is closed")]
    Closed(ConnectionId),
}

/// Failure to interpret inbound text as a routing envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Envelope must be a JSON object")]
    NotAnObject,
}
