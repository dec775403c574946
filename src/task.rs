// Task data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do item
///
/// Serialized with camelCase keys so the stored `tasks` value reads
/// `{"id", "text", "completed", "createdAt"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a new pending task from raw input
    ///
    /// Returns `None` when the trimmed text is empty.
    pub fn new(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            id: new_id(),
            text: text.to_string(),
            completed: false,
            created_at: Utc::now(),
        })
    }
}

/// Generate a fresh task id
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}
