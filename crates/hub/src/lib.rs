//! Transport-independent core of the messaging hub.
//!
//! - [`Connection`]: one outbound queue plus liveness flag for a single
//!   physical connection.
//! - [`HeartbeatMonitor`]: per-connection keep-alive task.
//! - [`ConnectionRegistry`]: user id to open connections, with the
//!   [`PresenceCounter`] updated inside the same critical section.
//! - [`MessageRouter`]: envelope parsing and fan-out.
//! - [`Hub`]: lifecycle glue used by the transport layer, and the
//!   administrative `push_to_user` entry point.

pub mod config;
pub mod connection;
pub mod heartbeat;
pub mod hub;
pub mod presence;
pub mod registry;
pub mod router;

pub use config::HubConfig;
pub use connection::Connection;
pub use heartbeat::{HeartbeatMonitor, HeartbeatState};
pub use hub::{Hub, Session};
pub use presence::PresenceCounter;
pub use registry::{ConnectionRegistry, Registration};
pub use router::{MessageRouter, RouteOutcome};
