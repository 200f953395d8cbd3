use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Priority;

/// A sticky note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub color_hex: String,
    pub is_pinned: bool,
    pub priority: Priority,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub is_synced: bool,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: String::new(),
            // Default yellow sticky note
            color_hex: "#FFF9C4".to_string(),
            is_pinned: false,
            priority: Priority::Low,
            timestamp: Utc::now(),
            is_synced: false,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_color(mut self, color_hex: impl Into<String>) -> Self {
        self.color_hex = color_hex.into();
        self
    }

    pub fn pinned(mut self) -> Self {
        self.is_pinned = true;
        self
    }
}
