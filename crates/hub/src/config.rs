use std::time::Duration;

/// Text sent as the first frame on every newly opened connection.
pub const DEFAULT_WELCOME_TEXT: &str = "连接成功";

/// Keep-alive text sent on every heartbeat tick.
pub const HEARTBEAT_TEXT: &str = "heartbeat";

/// Default interval between heartbeats (in seconds).
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Tunables for connection lifecycle handling.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Period of each connection's heartbeat; first tick fires immediately.
    pub heartbeat_interval: Duration,
    /// Plain-text confirmation pushed to a connection right after it opens.
    pub welcome_text: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            welcome_text: DEFAULT_WELCOME_TEXT.to_string(),
        }
    }
}
