use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Priority;

/// A planner task.
///
/// `is_synced` is a device-local dirty flag and never appears in the
/// remote document representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub is_completed: bool,
    pub due_date: DateTime<Utc>,
    pub priority: Priority,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pub is_synced: bool,
}

impl Task {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category: "General".to_string(),
            is_completed: false,
            due_date: now,
            priority: Priority::Medium,
            description: String::new(),
            timestamp: now,
            is_synced: false,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
