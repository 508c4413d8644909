use crate::error::{Result, SignalError};
use crate::readers::RecordingHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Session used when callers do not supply one.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingKind {
    /// Multi-channel `Time` + `Data` container.
    Eeg,
    /// Collection of high-rate vitals waveforms.
    Waves,
    /// Collection of low-rate vitals numerics.
    Numerics,
}

impl RecordingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingKind::Eeg => "eeg",
            RecordingKind::Waves => "waves",
            RecordingKind::Numerics => "numerics",
        }
    }
}

impl fmt::Display for RecordingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordingKind {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "eeg" => Ok(RecordingKind::Eeg),
            "waves" => Ok(RecordingKind::Waves),
            "numerics" => Ok(RecordingKind::Numerics),
            other => Err(SignalError::InvalidData(format!("Unknown recording kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordingKey {
    pub session: String,
    pub kind: RecordingKind,
}

impl RecordingKey {
    pub fn new(session: impl Into<String>, kind: RecordingKind) -> Self {
        Self {
            session: session.into(),
            kind,
        }
    }

    pub fn default_session(kind: RecordingKind) -> Self {
        Self::new(DEFAULT_SESSION, kind)
    }
}

impl fmt::Display for RecordingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.kind)
    }
}

/// Registry of the current recording per `(session, kind)`.
///
/// Holds references only. Handles are cloned out and dereferenced by the
/// caller, so the lock is never held across parsing.
#[derive(Debug, Default)]
pub struct RecordingStore {
    handles: RwLock<HashMap<RecordingKey, RecordingHandle>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `key`, returning the handle it replaced.
    pub fn register(&self, key: RecordingKey, handle: RecordingHandle) -> Option<RecordingHandle> {
        log::info!("Registering {} recording: {}", key, handle.describe());
        self.handles.write().insert(key, handle)
    }

    pub fn get(&self, key: &RecordingKey) -> Option<RecordingHandle> {
        self.handles.read().get(key).cloned()
    }

    pub fn contains(&self, key: &RecordingKey) -> bool {
        self.handles.read().contains_key(key)
    }

    /// Release the handle under `key`.
    pub fn clear(&self, key: &RecordingKey) -> Option<RecordingHandle> {
        let removed = self.handles.write().remove(key);
        if removed.is_some() {
            log::info!("Cleared {} recording", key);
        }
        removed
    }

    /// Release every handle of one session.
    pub fn clear_session(&self, session: &str) -> Vec<RecordingHandle> {
        let mut handles = self.handles.write();
        let keys: Vec<RecordingKey> = handles
            .keys()
            .filter(|k| k.session == session)
            .cloned()
            .collect();
        let removed: Vec<RecordingHandle> = keys.iter().filter_map(|k| handles.remove(k)).collect();
        if !removed.is_empty() {
            log::info!("Cleared {} recording(s) of session {}", removed.len(), session);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_register_replaces_previous() {
        let store = RecordingStore::new();
        let key = RecordingKey::default_session(RecordingKind::Eeg);
        assert!(store
            .register(key.clone(), RecordingHandle::File(PathBuf::from("/a.mat")))
            .is_none());
        let previous = store.register(key.clone(), RecordingHandle::File(PathBuf::from("/b.mat")));
        assert_eq!(previous.unwrap().path(), Some(PathBuf::from("/a.mat").as_path()));
        assert_eq!(store.get(&key).unwrap().path(), Some(PathBuf::from("/b.mat").as_path()));
    }

    #[test]
    fn test_kinds_and_sessions_are_independent() {
        let store = RecordingStore::new();
        store.register(
            RecordingKey::new("a", RecordingKind::Waves),
            RecordingHandle::File(PathBuf::from("/w.mat")),
        );
        store.register(
            RecordingKey::new("a", RecordingKind::Numerics),
            RecordingHandle::File(PathBuf::from("/n.mat")),
        );
        store.register(
            RecordingKey::new("b", RecordingKind::Waves),
            RecordingHandle::File(PathBuf::from("/w2.mat")),
        );
        assert!(store.get(&RecordingKey::new("a", RecordingKind::Eeg)).is_none());

        assert!(store.clear(&RecordingKey::new("a", RecordingKind::Waves)).is_some());
        assert!(store.clear(&RecordingKey::new("a", RecordingKind::Waves)).is_none());
        assert_eq!(store.len(), 2);

        assert_eq!(store.clear_session("a").len(), 1);
        assert!(store.contains(&RecordingKey::new("b", RecordingKind::Waves)));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Waves".parse::<RecordingKind>().unwrap(), RecordingKind::Waves);
        assert!("video".parse::<RecordingKind>().is_err());
        assert_eq!(RecordingKey::new("s", RecordingKind::Eeg).to_string(), "s/eeg");
    }
}
