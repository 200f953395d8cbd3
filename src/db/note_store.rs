use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::{parse_id, parse_timestamp};
use crate::models::{Note, Priority};

pub struct NoteStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: String,
    title: String,
    content: String,
    color_hex: String,
    is_pinned: bool,
    priority: String,
    timestamp: String,
    is_synced: bool,
}

impl NoteRow {
    fn into_note(self) -> Result<Note, sqlx::Error> {
        Ok(Note {
            id: parse_id(&self.id)?,
            title: self.title,
            content: self.content,
            color_hex: self.color_hex,
            is_pinned: self.is_pinned,
            priority: Priority::from_str(&self.priority).unwrap_or(Priority::Low),
            timestamp: parse_timestamp(&self.timestamp),
            is_synced: self.is_synced,
        })
    }
}

impl NoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, note: &Note) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO notes
                (id, title, content, color_hex, is_pinned, priority, timestamp, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(note.id.to_string())
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.color_hex)
        .bind(note.is_pinned)
        .bind(note.priority.to_string())
        .bind(note.timestamp.to_rfc3339())
        .bind(note.is_synced)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn apply_remote(&self, note: &Note) -> Result<(), sqlx::Error> {
        let mut clean = note.clone();
        clean.is_synced = true;
        self.upsert(&clean).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Note>, sqlx::Error> {
        let row: Option<NoteRow> = sqlx::query_as("SELECT * FROM notes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(NoteRow::into_note).transpose()
    }

    /// Pinned notes first, then newest first.
    pub async fn list(&self) -> Result<Vec<Note>, sqlx::Error> {
        let rows: Vec<NoteRow> =
            sqlx::query_as("SELECT * FROM notes ORDER BY is_pinned DESC, timestamp DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(NoteRow::into_note).collect()
    }

    pub async fn unsynced(&self) -> Result<Vec<Note>, sqlx::Error> {
        let rows: Vec<NoteRow> = sqlx::query_as("SELECT * FROM notes WHERE is_synced = 0 ORDER BY timestamp")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(NoteRow::into_note).collect()
    }

    pub async fn mark_synced(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notes SET is_synced = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_note_roundtrip() {
        let (pool, _dir) = test_pool().await;
        let store = NoteStore::new(pool);

        let note = Note::new("Groceries").with_content("milk, eggs").with_color("#B3E5FC");
        store.upsert(&note).await.unwrap();

        let fetched = store.get(note.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "milk, eggs");
        assert_eq!(fetched.color_hex, "#B3E5FC");
        assert!(!fetched.is_synced);
    }

    #[tokio::test]
    async fn test_list_orders_pinned_first() {
        let (pool, _dir) = test_pool().await;
        let store = NoteStore::new(pool);

        store.upsert(&Note::new("plain")).await.unwrap();
        let pinned = Note::new("important").pinned();
        store.upsert(&pinned).await.unwrap();

        let notes = store.list().await.unwrap();
        assert_eq!(notes[0].id, pinned.id);
    }

    #[tokio::test]
    async fn test_unsynced_and_mark_synced() {
        let (pool, _dir) = test_pool().await;
        let store = NoteStore::new(pool);

        let note = Note::new("draft");
        store.upsert(&note).await.unwrap();
        assert_eq!(store.unsynced().await.unwrap().len(), 1);

        store.mark_synced(note.id).await.unwrap();
        assert!(store.unsynced().await.unwrap().is_empty());
    }
}
