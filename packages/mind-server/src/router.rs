use crate::handlers::{
    add_timestamp, clear_eeg, clear_session, clear_timestamps, clear_vitals, delete_timestamp,
    export_timestamps, get_eeg_live, get_eeg_spectrogram, get_eeg_trend, get_eeg_window,
    get_vitals_live, get_vitals_trend, health_check, list_timestamps, root, test_graphs,
    test_vitals, update_timestamp, upload_eeg, upload_vitals,
};
use crate::state::ServerState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Body limit for everything except recording uploads
const MAX_API_BODY_SIZE: usize = 1024 * 1024;

pub fn create_router(state: Arc<ServerState>) -> Router {
    let api_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // EEG graphs
        .route("/api/graphs/eeg/live", get(get_eeg_live))
        .route("/api/graphs/eeg/window", get(get_eeg_window))
        .route("/api/graphs/eeg/spectrogram", get(get_eeg_spectrogram))
        .route("/api/graphs/eeg/trend", get(get_eeg_trend))
        .route("/api/graphs/eeg/clear", delete(clear_eeg))
        .route("/api/graphs/test", get(test_graphs))
        // Vitals
        .route("/api/vitals/live", get(get_vitals_live))
        .route("/api/vitals/trend", get(get_vitals_trend))
        .route("/api/vitals/clear/{kind}", delete(clear_vitals))
        .route("/api/vitals/test", get(test_vitals))
        // Sessions
        .route("/api/sessions/{session}", delete(clear_session))
        // Timestamp annotations; clients also use the trailing-slash form
        .route(
            "/api/timestamps",
            get(list_timestamps)
                .post(add_timestamp)
                .delete(clear_timestamps),
        )
        .route(
            "/api/timestamps/",
            get(list_timestamps)
                .post(add_timestamp)
                .delete(clear_timestamps),
        )
        .route("/api/timestamps/export", get(export_timestamps))
        .route(
            "/api/timestamps/{id}",
            put(update_timestamp).delete(delete_timestamp),
        )
        .layer(RequestBodyLimitLayer::new(MAX_API_BODY_SIZE));

    // Uploads get their own, larger body limit
    let max_upload_size = usize::try_from(state.config.max_upload_size).unwrap_or(usize::MAX);
    let upload_routes = Router::new()
        .route("/api/graphs/eeg/upload", post(upload_eeg))
        .route("/api/vitals/upload/{kind}", post(upload_vitals))
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(RequestBodyLimitLayer::new(max_upload_size));

    let cors = cors_layer(&state);

    Router::new()
        .merge(api_routes)
        .merge(upload_routes)
        .fallback(handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(state: &ServerState) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if state.config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true)
}

async fn handle_404() -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!("404 - Endpoint not found");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "status": "error",
            "message": "Endpoint not found"
        })),
    )
}
