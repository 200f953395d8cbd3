use sqlx::SqlitePool;
use std::str::FromStr;
use uuid::Uuid;

use super::{parse_id, parse_timestamp};
use crate::models::{Recurrence, Transaction, TransactionKind};

pub struct TransactionStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: String,
    title: String,
    amount: f64,
    kind: String,
    category: String,
    is_recurring: bool,
    recurrence: String,
    timestamp: String,
    is_synced: bool,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction, sqlx::Error> {
        Ok(Transaction {
            id: parse_id(&self.id)?,
            title: self.title,
            amount: self.amount,
            kind: TransactionKind::from_str(&self.kind).unwrap_or(TransactionKind::Expense),
            category: self.category,
            is_recurring: self.is_recurring,
            recurrence: Recurrence::from_str(&self.recurrence).unwrap_or(Recurrence::None),
            timestamp: parse_timestamp(&self.timestamp),
            is_synced: self.is_synced,
        })
    }
}

impl TransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, tx: &Transaction) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO transactions
                (id, title, amount, kind, category, is_recurring, recurrence, timestamp, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(tx.id.to_string())
        .bind(&tx.title)
        .bind(tx.amount)
        .bind(tx.kind.to_string())
        .bind(&tx.category)
        .bind(tx.is_recurring)
        .bind(tx.recurrence.to_string())
        .bind(tx.timestamp.to_rfc3339())
        .bind(tx.is_synced)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn apply_remote(&self, tx: &Transaction) -> Result<(), sqlx::Error> {
        let mut clean = tx.clone();
        clean.is_synced = true;
        self.upsert(&clean).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Transaction>, sqlx::Error> {
        let row: Option<TransactionRow> = sqlx::query_as("SELECT * FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TransactionRow::into_transaction).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> =
            sqlx::query_as("SELECT * FROM transactions ORDER BY timestamp DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    pub async fn unsynced(&self) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> =
            sqlx::query_as("SELECT * FROM transactions WHERE is_synced = 0 ORDER BY timestamp")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    pub async fn mark_synced(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE transactions SET is_synced = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
