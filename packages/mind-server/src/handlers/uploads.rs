use crate::error::ApiError;
use crate::state::ServerState;
use axum::extract::Multipart;
use mind_core::{RecordingHandle, RecordingKey, RecordingReaderFactory};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Response for recording upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub session: String,
    pub kind: String,
    pub filename: String,
    pub size: u64,
}

/// Save the `file` field of a multipart form under a unique name and
/// register it under `key`. A previous upload for the key is deleted.
pub(crate) async fn receive_recording(
    state: &ServerState,
    key: RecordingKey,
    mut multipart: Multipart,
) -> Result<UploadResponse, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart data: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no name".to_string()))?;
        if !RecordingReaderFactory::is_supported(Path::new(&filename)) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file type '{}'. Supported extensions: {}",
                filename,
                RecordingReaderFactory::supported_extensions().join(", ")
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
        if data.len() as u64 > state.config.max_upload_size {
            return Err(ApiError::PayloadTooLarge(format!(
                "File too large. Maximum size: {} bytes",
                state.config.max_upload_size
            )));
        }

        let file_path = save_upload(&state.config.upload_directory, &filename, &data).await?;
        info!(
            "{} recording uploaded: {} -> {} ({} bytes)",
            key,
            filename,
            file_path.display(),
            data.len()
        );

        let previous = state
            .engine
            .register(key.clone(), RecordingHandle::File(file_path));
        discard_upload(state, previous).await;

        return Ok(UploadResponse {
            status: "success".to_string(),
            session: key.session,
            kind: key.kind.to_string(),
            filename,
            size: data.len() as u64,
        });
    }

    Err(ApiError::BadRequest("No file provided".to_string()))
}

async fn save_upload(directory: &Path, filename: &str, data: &[u8]) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(directory).await.map_err(|e| {
        error!("Failed to create upload directory: {}", e);
        ApiError::Internal("Upload failed".to_string())
    })?;

    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let file_path = directory.join(format!("{}.{}", Uuid::new_v4(), ext));

    tokio::fs::write(&file_path, data).await.map_err(|e| {
        error!("Failed to save uploaded file: {}", e);
        ApiError::Internal("Failed to save file".to_string())
    })?;
    Ok(file_path)
}

/// Delete the file behind a released handle if it lives in the upload directory.
pub(crate) async fn discard_upload(state: &ServerState, handle: Option<RecordingHandle>) {
    let Some(path) = handle.as_ref().and_then(|h| h.path()) else {
        return;
    };
    if !path.starts_with(&state.config.upload_directory) {
        return;
    }
    match tokio::fs::remove_file(path).await {
        Ok(()) => info!("Removed upload {}", path.display()),
        Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
    }
}
