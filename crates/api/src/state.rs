use std::sync::Arc;

use imhub_hub::Hub;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Connection registry, router and lifecycle glue.
    pub hub: Arc<Hub>,
}
