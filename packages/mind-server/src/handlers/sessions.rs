use super::uploads::discard_upload;
use super::StatusResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

/// Drop every recording (EEG, waves and numerics) registered under a session.
pub async fn clear_session(
    State(state): State<Arc<ServerState>>,
    Path(session): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let session = session.trim();
    if session.is_empty() {
        return Err(ApiError::BadRequest("Session name must not be empty".to_string()));
    }

    let released = state.engine.clear_session(session);
    let count = released.len();
    for handle in released {
        discard_upload(&state, Some(handle)).await;
    }
    Ok(Json(StatusResponse::success(format!(
        "Cleared {} recording(s) of session {}",
        count, session
    ))))
}
