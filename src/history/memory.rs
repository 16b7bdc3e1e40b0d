use async_trait::async_trait;
use std::sync::Mutex;
use uuid::Uuid;

use super::{ timestamp_score, MessageStore };
use crate::error::ChatError;
use crate::models::chat::Turn;

/// Process-local store; contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryMessageStore {
    documents: Mutex<Vec<Turn>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Turn>>, ChatError> {
        self.documents.lock().map_err(|e| ChatError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn list_messages(&self) -> Result<Vec<Turn>, ChatError> {
        let mut turns = self.lock()?.clone();
        turns.sort_by_key(timestamp_score);
        Ok(turns)
    }

    async fn add_message(&self, turn: &Turn) -> Result<String, ChatError> {
        let id = Uuid::new_v4().to_string();
        let mut stored = turn.clone();
        stored.id = Some(id.clone());
        self.lock()?.push(stored);
        Ok(id)
    }

    async fn delete_message(&self, id: &str) -> Result<(), ChatError> {
        self.lock()?.retain(|t| t.id.as_deref() != Some(id));
        Ok(())
    }

    async fn clear_messages(&self) -> Result<usize, ChatError> {
        let mut documents = self.lock()?;
        let removed = documents.len();
        documents.clear();
        Ok(removed)
    }
}
