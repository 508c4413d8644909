use super::uploads::{discard_upload, receive_recording, UploadResponse};
use super::{run_blocking, SessionQuery, StatusResponse, WindowQuery};
use crate::error::{ApiError, ApiResult};
use crate::state::ServerState;
use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use mind_core::{RecordingKind, TrendResult, WindowResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// `waves` or `numerics`; EEG recordings go through the graphs routes.
fn vitals_kind(kind: &str) -> Result<RecordingKind, ApiError> {
    match kind.parse::<RecordingKind>() {
        Ok(kind @ (RecordingKind::Waves | RecordingKind::Numerics)) => Ok(kind),
        _ => Err(ApiError::BadRequest(format!(
            "Unknown vitals recording kind '{}', expected 'waves' or 'numerics'",
            kind
        ))),
    }
}

/// ECG/ABP (and Pleth/Resp when present) waveforms
pub async fn get_vitals_live(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<WindowResult>> {
    let key = query.key(RecordingKind::Waves);
    let request = query.request(state.engine.config().live_window_s)?;
    let result = run_blocking(move || state.engine.get_vitals_live(&key, request)).await?;
    Ok(Json(result))
}

/// HR, SpO2 and MAP trends
pub async fn get_vitals_trend(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<TrendResult>> {
    let key = query.key(RecordingKind::Numerics);
    let result = run_blocking(move || state.engine.get_vitals_trend(&key)).await?;
    Ok(Json(result))
}

pub async fn upload_vitals(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
    Query(query): Query<SessionQuery>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let key = query.key(vitals_kind(&kind)?);
    Ok(Json(receive_recording(&state, key, multipart).await?))
}

pub async fn clear_vitals(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let kind = vitals_kind(&kind)?;
    let released = state.engine.clear(&query.key(kind));
    discard_upload(&state, released).await;
    Ok(Json(StatusResponse::success(format!("Vitals {} recording cleared", kind))))
}

pub async fn test_vitals() -> Json<Value> {
    Json(json!({"status": "Vitals route working"}))
}
