use async_trait::async_trait;

use crate::core::error::StorageError;

/// Per-user ordered task list. Indexes are 1-based, as shown to users.
#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), StorageError>;

    /// Remove the `index`-th task and return its text, or
    /// `StorageError::NotFound` when there is no such task.
    async fn remove(&self, user_id: &str, index: usize) -> Result<String, StorageError>;

    async fn list(&self, user_id: &str) -> Result<Vec<String>, StorageError>;
}
