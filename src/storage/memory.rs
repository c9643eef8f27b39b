use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::core::error::StorageError;
use crate::core::todo::TodoStore;

/// Process-lifetime to-do lists, for runs without a database.
#[derive(Default)]
pub struct MemoryTodoStore {
    lists: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn add(&self, user_id: &str, text: &str) -> Result<(), StorageError> {
        self.lists
            .lock()
            .await
            .entry(user_id.to_string())
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    async fn remove(&self, user_id: &str, index: usize) -> Result<String, StorageError> {
        let mut lists = self.lists.lock().await;
        match lists.get_mut(user_id) {
            Some(tasks) if (1..=tasks.len()).contains(&index) => Ok(tasks.remove(index - 1)),
            _ => Err(StorageError::NotFound(format!(
                "task {index} for user {user_id}"
            ))),
        }
    }

    async fn list(&self, user_id: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .lists
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }
}
