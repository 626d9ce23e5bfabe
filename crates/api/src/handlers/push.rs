//! Administrative push: server-originated text to one user's connections.

use axum::extract::{Path, State};
use axum::Json;
use imhub_core::types::is_blank;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /push/{user_id}`.
#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PushResponse {
    /// Whether the user had at least one open connection.
    pub delivered: bool,
}

/// POST /api/v1/push/{user_id}
pub async fn push_to_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<PushRequest>,
) -> AppResult<Json<DataResponse<PushResponse>>> {
    if is_blank(&user_id) {
        return Err(AppError::BadRequest("user_id must not be blank".into()));
    }
    if is_blank(&body.message) {
        return Err(AppError::BadRequest("message must not be blank".into()));
    }

    let delivered = state.hub.push_to_user(&user_id, &body.message);

    Ok(Json(DataResponse {
        data: PushResponse { delivered },
    }))
}
