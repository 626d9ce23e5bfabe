pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// WebSocket routes, mounted at the root.
///
/// ```text
/// /imserver/{user_id}                              WebSocket
/// ```
pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/imserver/{user_id}", get(ws::ws_handler))
}

/// Build the `/api/v1` route tree.
///
/// ```text
/// /push/{user_id}                                  push text to a user (POST)
/// /presence                                        online summary (GET)
/// /presence/{user_id}                              one user's presence (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/push/{user_id}", post(handlers::push::push_to_user))
        .route("/presence", get(handlers::presence::summary))
        .route("/presence/{user_id}", get(handlers::presence::user_presence))
}
