//! Shared vocabulary for the messaging hub: identifiers, the routing
//! envelope, and the error taxonomy used by every other crate.

pub mod envelope;
pub mod error;
pub mod types;
