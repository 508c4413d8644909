pub mod config;
pub mod engine;
pub mod error;
pub mod readers;
pub mod roles;
pub mod spectrogram;
pub mod store;
pub mod synth;
pub mod trend;
pub mod types;
pub mod validity;
pub mod window;

pub use config::EngineConfig;
pub use engine::SignalEngine;
pub use error::{Result, SignalError};
pub use readers::{MemorySource, RecordingHandle, RecordingReaderFactory, RecordingSource};
pub use store::{RecordingKey, RecordingKind, RecordingStore};
pub use types::*;
pub use validity::SentinelPolicy;
