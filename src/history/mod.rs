mod memory;
mod redis;
use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::sync::Arc;
use crate::cli::HistoryArgs;
use crate::error::ChatError;
use crate::models::chat::Turn;

pub use self::memory::MemoryMessageStore;
pub use self::redis::RedisMessageStore;

/// The `messages` collection: turns persisted across sessions.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// All persisted turns ordered by timestamp ascending, each carrying its id.
    async fn list_messages(&self) -> Result<Vec<Turn>, ChatError>;

    /// Persists one turn and returns the id assigned to it.
    async fn add_message(&self, turn: &Turn) -> Result<String, ChatError>;

    async fn delete_message(&self, id: &str) -> Result<(), ChatError>;

    /// Removes every document in the collection, including entries that
    /// `list_messages` skips, and returns how many were removed.
    async fn clear_messages(&self) -> Result<usize, ChatError>;
}

pub fn create_message_store(
    args: &HistoryArgs
) -> Result<Arc<dyn MessageStore>, Box<dyn Error + Send + Sync>> {
    match args.history_type.to_lowercase().as_str() {
        "redis" => {
            let store = RedisMessageStore::new(&args.history_host, &args.history_redis_prefix)?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryMessageStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported history store type: {}", args.history_type)
                    )
                )
            ),
    }
}

pub fn initialize_message_store(
    args: &HistoryArgs
) -> Result<Arc<dyn MessageStore>, Box<dyn Error + Send + Sync>> {
    info!("Chat history will be stored in: {} at {}", args.history_type, args.history_host);
    create_message_store(args)
}

/// Sort key for a persisted turn; turns without a timestamp sort first.
pub(crate) fn timestamp_score(turn: &Turn) -> i64 {
    turn.timestamp.map(|t| t.timestamp_millis()).unwrap_or(0)
}
