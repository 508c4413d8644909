mod graphs;
mod health;
mod sessions;
mod timestamps;
mod uploads;
mod vitals;

pub use graphs::*;
pub use health::*;
pub use sessions::*;
pub use timestamps::*;
pub use uploads::UploadResponse;
pub use vitals::*;

use crate::error::ApiError;
use mind_core::store::DEFAULT_SESSION;
use mind_core::{RecordingKey, RecordingKind, WindowRequest};
use serde::{Deserialize, Serialize};

/// Query params for window and spectrogram requests
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub session: Option<String>,
    pub offset: Option<f64>,
    pub duration: Option<f64>,
}

impl WindowQuery {
    pub fn key(&self, kind: RecordingKind) -> RecordingKey {
        session_key(self.session.as_deref(), kind)
    }

    /// Offset defaults to 0; duration to `default_duration`. Offsets are
    /// clamped by the engine, durations must be positive.
    pub fn request(&self, default_duration: f64) -> Result<WindowRequest, ApiError> {
        let offset = self.offset.unwrap_or(0.0);
        let duration = self.duration.unwrap_or(default_duration);
        if !offset.is_finite() {
            return Err(ApiError::BadRequest("offset must be a finite number".to_string()));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ApiError::BadRequest(format!(
                "duration must be a positive number of seconds, got {}",
                duration
            )));
        }
        Ok(WindowRequest::new(offset, duration))
    }
}

/// Query params for endpoints addressing a recording only
#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

impl SessionQuery {
    pub fn key(&self, kind: RecordingKind) -> RecordingKey {
        session_key(self.session.as_deref(), kind)
    }
}

fn session_key(session: Option<&str>, kind: RecordingKind) -> RecordingKey {
    let session = session
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION);
    RecordingKey::new(session, kind)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.into()),
        }
    }
}

/// Run parsing and FFT work off the async executor.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Worker task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_query_defaults() {
        let query = WindowQuery::default();
        let request = query.request(30.0).unwrap();
        assert_eq!(request.offset, 0.0);
        assert_eq!(request.duration, 30.0);
        assert_eq!(query.key(RecordingKind::Eeg).session, DEFAULT_SESSION);
    }

    #[test]
    fn test_window_query_rejects_bad_duration() {
        for duration in [0.0, -5.0, f64::INFINITY] {
            let query = WindowQuery {
                duration: Some(duration),
                ..WindowQuery::default()
            };
            assert!(query.request(10.0).is_err());
        }
        let negative_offset = WindowQuery {
            offset: Some(-3.0),
            ..WindowQuery::default()
        };
        assert_eq!(negative_offset.request(10.0).unwrap().offset, -3.0);
    }

    #[test]
    fn test_blank_session_uses_default() {
        let query = SessionQuery {
            session: Some("  ".to_string()),
        };
        assert_eq!(query.key(RecordingKind::Waves).session, DEFAULT_SESSION);
    }
}
