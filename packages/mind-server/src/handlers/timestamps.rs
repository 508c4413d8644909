use super::StatusResponse;
use crate::annotations::{Timestamp, TimestampCreate, TimestampUpdate};
use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct TimestampListResponse {
    pub timestamps: Vec<Timestamp>,
}

#[derive(Debug, Serialize)]
pub struct TimestampResponse {
    pub status: String,
    pub timestamp: Timestamp,
}

impl TimestampResponse {
    fn success(timestamp: Timestamp) -> Self {
        Self {
            status: "success".to_string(),
            timestamp,
        }
    }
}

pub async fn list_timestamps(State(state): State<Arc<ServerState>>) -> Json<TimestampListResponse> {
    Json(TimestampListResponse {
        timestamps: state.timestamps.list(),
    })
}

pub async fn add_timestamp(
    State(state): State<Arc<ServerState>>,
    Json(create): Json<TimestampCreate>,
) -> Json<TimestampResponse> {
    Json(TimestampResponse::success(state.timestamps.add(create)))
}

pub async fn update_timestamp(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
    Json(update): Json<TimestampUpdate>,
) -> ApiResult<Json<TimestampResponse>> {
    state
        .timestamps
        .update(id, update)
        .map(|t| Json(TimestampResponse::success(t)))
        .ok_or_else(|| ApiError::NotFound("Timestamp not found".to_string()))
}

pub async fn delete_timestamp(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<StatusResponse>> {
    if state.timestamps.delete(id) {
        Ok(Json(StatusResponse::success(format!("Timestamp {} deleted", id))))
    } else {
        Err(ApiError::NotFound("Timestamp not found".to_string()))
    }
}

pub async fn clear_timestamps(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    state.timestamps.clear();
    Json(StatusResponse::success("All timestamps cleared"))
}

/// Download every timestamp as `timestamps.json`
pub async fn export_timestamps(State(state): State<Arc<ServerState>>) -> ApiResult<impl IntoResponse> {
    let export = state
        .timestamps
        .export()
        .ok_or_else(|| ApiError::BadRequest("No timestamps to export".to_string()))?;
    let body = serde_json::to_string_pretty(&export)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize timestamps: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_DISPOSITION, "attachment; filename=timestamps.json"),
        ],
        body,
    ))
}
