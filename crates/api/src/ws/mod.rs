//! WebSocket transport for the hub.
//!
//! Adapts an upgraded axum socket to the hub's connection lifecycle:
//! open, inbound text, close and error.

mod handler;

pub use handler::ws_handler;
