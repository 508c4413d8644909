//! In-memory timestamp annotations.
//!
//! Ids are assigned as `len + 1` at insertion time, so an id freed by a
//! delete can be handed out again. Lookups by id act on the first match.

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timestamp {
    pub id: u64,
    pub time_offset: f64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimestampCreate {
    pub time_offset: f64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimestampUpdate {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampExport {
    pub exported_at: String,
    pub timestamps: Vec<Timestamp>,
}

#[derive(Debug, Default)]
pub struct TimestampStore {
    entries: RwLock<Vec<Timestamp>>,
}

impl TimestampStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> Vec<Timestamp> {
        self.entries.read().clone()
    }

    pub fn add(&self, create: TimestampCreate) -> Timestamp {
        let mut entries = self.entries.write();
        let timestamp = Timestamp {
            id: entries.len() as u64 + 1,
            time_offset: create.time_offset,
            description: create.description,
            created_at: Utc::now().to_rfc3339(),
        };
        entries.push(timestamp.clone());
        timestamp
    }

    pub fn update(&self, id: u64, update: TimestampUpdate) -> Option<Timestamp> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|t| t.id == id)?;
        entry.description = update.description;
        Some(entry.clone())
    }

    /// Remove every entry with `id`; `false` if none existed.
    pub fn delete(&self, id: u64) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|t| t.id != id);
        entries.len() < before
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Snapshot for download; `None` when there is nothing to export.
    pub fn export(&self) -> Option<TimestampExport> {
        let entries = self.entries.read();
        if entries.is_empty() {
            return None;
        }
        Some(TimestampExport {
            exported_at: Utc::now().to_rfc3339(),
            timestamps: entries.clone(),
        })
    }
}
