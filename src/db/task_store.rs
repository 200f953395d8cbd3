use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::{parse_id, parse_timestamp};
use crate::models::{Priority, Task};

/// Local table of tasks. SQLite is the only thing reads ever touch;
/// the sync worker reconciles it with the remote mirror.
pub struct TaskStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: String,
    title: String,
    category: String,
    is_completed: bool,
    due_date: String,
    priority: String,
    description: String,
    timestamp: String,
    is_synced: bool,
}

impl TaskRow {
    fn into_task(self) -> Result<Task, sqlx::Error> {
        Ok(Task {
            id: parse_id(&self.id)?,
            title: self.title,
            category: self.category,
            is_completed: self.is_completed,
            due_date: parse_timestamp(&self.due_date),
            priority: Priority::from_str(&self.priority).unwrap_or(Priority::Medium),
            description: self.description,
            timestamp: parse_timestamp(&self.timestamp),
            is_synced: self.is_synced,
        })
    }
}

impl TaskStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Inserts or fully overwrites a row, keeping the entity's own
    /// `is_synced` value.
    pub async fn upsert(&self, task: &Task) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO tasks
                (id, title, category, is_completed, due_date, priority, description, timestamp, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.category)
        .bind(task.is_completed)
        .bind(task.due_date.to_rfc3339())
        .bind(task.priority.to_string())
        .bind(&task.description)
        .bind(task.timestamp.to_rfc3339())
        .bind(task.is_synced)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Upsert coming from a remote pull; the row lands clean.
    pub async fn apply_remote(&self, task: &Task) -> Result<(), sqlx::Error> {
        let mut clean = task.clone();
        clean.is_synced = true;
        self.upsert(&clean).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TaskRow::into_task).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Task>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    pub async fn unsynced(&self) -> Result<Vec<Task>, sqlx::Error> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE is_synced = 0 ORDER BY timestamp")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TaskRow::into_task).collect()
    }

    pub async fn mark_synced(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET is_synced = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
