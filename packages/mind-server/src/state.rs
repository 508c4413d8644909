use crate::annotations::TimestampStore;
use crate::config::ServerConfig;
use mind_core::{RecordingStore, SignalEngine};
use std::sync::Arc;
use std::time::Instant;

/// Main server state shared across all handlers
pub struct ServerState {
    pub config: ServerConfig,
    pub engine: SignalEngine,
    pub timestamps: TimestampStore,
    pub start_time: Instant,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let engine = SignalEngine::new(Arc::new(RecordingStore::new()), config.engine.clone());
        Self {
            config,
            engine,
            timestamps: TimestampStore::new(),
            start_time: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
