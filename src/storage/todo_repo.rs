use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::core::error::StorageError;
use crate::core::todo::TodoStore;

/// SQLite-backed to-do lists. Row ids keep insertion order per user.
pub struct TodoRepo {
    pool: SqlitePool,
}

impl TodoRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TodoStore for TodoRepo {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO tasks (user_id, task, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(text)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, user_id: &str, index: usize) -> Result<String, StorageError> {
        let not_found = || StorageError::NotFound(format!("task {index} for user {user_id}"));
        if index == 0 {
            return Err(not_found());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let row: Option<(i64, String)> = sqlx::query_as(
            "SELECT id, task FROM tasks WHERE user_id = ? \
             ORDER BY id LIMIT 1 OFFSET ?",
        )
        .bind(user_id)
        .bind((index - 1) as i64)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::Database(e.to_string()))?;

        let (id, task) = row.ok_or_else(not_found)?;

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(task)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<String>, StorageError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT task FROM tasks WHERE user_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|(task,)| task).collect())
    }
}
