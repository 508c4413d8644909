use mind_core::{EngineConfig, SentinelPolicy};
use std::env;
use std::path::PathBuf;

const DEFAULT_MAX_UPLOAD_SIZE: u64 = 512 * 1024 * 1024;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// Directory for uploaded recordings
    pub upload_directory: PathBuf,
    /// Maximum upload file size in bytes (default 512MB)
    pub max_upload_size: u64,
    /// CORS allowed origins (comma-separated in env var, `*` for any)
    pub cors_origins: Vec<String>,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: "127.0.0.1".to_string(),
            upload_directory: default_upload_directory(),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            cors_origins: vec!["*".to_string()],
            engine: EngineConfig::default(),
        }
    }
}

fn default_upload_directory() -> PathBuf {
    env::temp_dir().join("mind-uploads")
}

impl ServerConfig {
    /// Load configuration from `.env` and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("MIND_PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidPort)?,
            None => defaults.port,
        };

        let max_upload_size = match lookup("MIND_MAX_UPLOAD_SIZE") {
            Some(v) => v.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("MIND_MAX_UPLOAD_SIZE must be a byte count, got '{}'", v))
            })?,
            None => defaults.max_upload_size,
        };

        let sentinel = match lookup("MIND_SENTINEL").map(|v| v.trim().to_lowercase()) {
            None => SentinelPolicy::default(),
            Some(v) if v == "zero" => SentinelPolicy::ZeroIsInvalid,
            Some(v) if v == "none" => SentinelPolicy::KeepAll,
            Some(v) => {
                return Err(ConfigError::InvalidValue(format!(
                    "MIND_SENTINEL must be 'zero' or 'none', got '{}'",
                    v
                )))
            }
        };

        Ok(Self {
            port,
            bind_addr: lookup("MIND_BIND_ADDR").unwrap_or(defaults.bind_addr),
            upload_directory: lookup("MIND_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_directory),
            max_upload_size,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            engine: EngineConfig {
                sentinel,
                ..defaults.engine
            },
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|o| o == "*")
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
