use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("No recording registered for: {0}")]
    MissingRecording(String),

    #[error("Recording file not found: {0}")]
    FileNotFound(String),

    #[error("Required array '{0}' not found in recording")]
    MissingArray(String),

    #[error("Invalid recording format: {0}")]
    Format(String),

    #[error("Unsupported recording format: {0}")]
    UnsupportedFormat(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl SignalError {
    /// Errors that mean "there is nothing to read" rather than "the data is broken".
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            SignalError::MissingRecording(_) | SignalError::FileNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SignalError>;
