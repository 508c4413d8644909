use super::uploads::{discard_upload, receive_recording, UploadResponse};
use super::{run_blocking, SessionQuery, StatusResponse, WindowQuery};
use crate::error::ApiResult;
use crate::state::ServerState;
use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use mind_core::{RecordingKind, SpectrogramResult, TrendResult, WindowResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// Live EEG display; synthesized when no recording is usable
pub async fn get_eeg_live(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<WindowResult>> {
    let key = query.key(RecordingKind::Eeg);
    let request = query.request(state.engine.config().live_window_s)?;
    let result = run_blocking(move || state.engine.get_live(&key, request)).await?;
    Ok(Json(result))
}

/// Windowed channels of the registered EEG recording
pub async fn get_eeg_window(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<WindowResult>> {
    let key = query.key(RecordingKind::Eeg);
    let request = query.request(state.engine.config().live_window_s)?;
    let result = run_blocking(move || state.engine.get_window(&key, request)).await?;
    Ok(Json(result))
}

pub async fn get_eeg_spectrogram(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<SpectrogramResult>> {
    let key = query.key(RecordingKind::Eeg);
    let request = query.request(state.engine.config().spectrogram_window_s)?;
    let result = run_blocking(move || state.engine.get_spectrogram(&key, request)).await?;
    Ok(Json(result))
}

pub async fn get_eeg_trend(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Json<TrendResult>> {
    let key = query.key(RecordingKind::Eeg);
    let result = run_blocking(move || state.engine.get_trend(&key)).await?;
    Ok(Json(result))
}

pub async fn upload_eeg(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let key = query.key(RecordingKind::Eeg);
    Ok(Json(receive_recording(&state, key, multipart).await?))
}

pub async fn clear_eeg(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SessionQuery>,
) -> Json<StatusResponse> {
    let released = state.engine.clear(&query.key(RecordingKind::Eeg));
    discard_upload(&state, released).await;
    Json(StatusResponse::success("EEG recording cleared"))
}

pub async fn test_graphs() -> Json<Value> {
    Json(json!({"status": "Graphs route working"}))
}
