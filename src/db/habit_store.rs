use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_id, parse_timestamp};
use crate::models::Habit;

pub struct HabitStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct HabitRow {
    id: String,
    title: String,
    icon: String,
    // JSON array of RFC 3339 timestamps
    completed_dates: String,
    reminder_time: Option<String>,
    timestamp: String,
    is_synced: bool,
}

impl HabitRow {
    fn into_habit(self) -> Result<Habit, sqlx::Error> {
        let completed_dates: Vec<DateTime<Utc>> =
            serde_json::from_str(&self.completed_dates).unwrap_or_default();

        Ok(Habit {
            id: parse_id(&self.id)?,
            title: self.title,
            icon: self.icon,
            completed_dates,
            reminder_time: self.reminder_time,
            timestamp: parse_timestamp(&self.timestamp),
            is_synced: self.is_synced,
        })
    }
}

impl HabitStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, habit: &Habit) -> Result<(), sqlx::Error> {
        let completed_dates = serde_json::to_string(&habit.completed_dates)
            .unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO habits
                (id, title, icon, completed_dates, reminder_time, timestamp, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(habit.id.to_string())
        .bind(&habit.title)
        .bind(&habit.icon)
        .bind(&completed_dates)
        .bind(&habit.reminder_time)
        .bind(habit.timestamp.to_rfc3339())
        .bind(habit.is_synced)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn apply_remote(&self, habit: &Habit) -> Result<(), sqlx::Error> {
        let mut clean = habit.clone();
        clean.is_synced = true;
        self.upsert(&clean).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Habit>, sqlx::Error> {
        let row: Option<HabitRow> = sqlx::query_as("SELECT * FROM habits WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(HabitRow::into_habit).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Habit>, sqlx::Error> {
        let rows: Vec<HabitRow> = sqlx::query_as("SELECT * FROM habits ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(HabitRow::into_habit).collect()
    }

    pub async fn unsynced(&self) -> Result<Vec<Habit>, sqlx::Error> {
        let rows: Vec<HabitRow> = sqlx::query_as("SELECT * FROM habits WHERE is_synced = 0 ORDER BY timestamp")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(HabitRow::into_habit).collect()
    }

    pub async fn mark_synced(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE habits SET is_synced = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM habits WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
