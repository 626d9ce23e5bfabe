use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PresenceSummary {
    /// Distinct users with at least one open connection.
    pub online_users: usize,
    /// Open connections across all users.
    pub connections: usize,
}

#[derive(Debug, Serialize)]
pub struct UserPresence {
    pub user_id: String,
    pub online: bool,
    pub connections: usize,
}

/// GET /api/v1/presence
pub async fn summary(State(state): State<AppState>) -> Json<DataResponse<PresenceSummary>> {
    let registry = state.hub.registry();
    Json(DataResponse {
        data: PresenceSummary {
            online_users: registry.online_count(),
            connections: registry.connection_count(),
        },
    })
}

/// GET /api/v1/presence/{user_id}
pub async fn user_presence(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<DataResponse<UserPresence>> {
    let connections = state.hub.registry().user_connection_count(&user_id);
    Json(DataResponse {
        data: UserPresence {
            user_id,
            online: connections > 0,
            connections,
        },
    })
}
