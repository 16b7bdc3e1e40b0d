use async_trait::async_trait;
use log::{ error, warn };
use redis::{ AsyncCommands, Client };
use std::error::Error;
use uuid::Uuid;

use super::{ timestamp_score, MessageStore };
use crate::error::ChatError;
use crate::models::chat::Turn;

/// Each turn is a JSON document under `{prefix}{id}`; `{prefix}index` is a
/// sorted set of ids scored by timestamp millis.
///
/// Ids start with a zero-padded value from the `{prefix}seq` counter, so turns
/// sharing a millisecond reload in write order (Redis breaks score ties by
/// member).
pub struct RedisMessageStore {
    client: Client,
    key_prefix: String,
}

impl RedisMessageStore {
    pub fn new(host: &str, key_prefix: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            client: Client::open(host)?,
            key_prefix: key_prefix.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    fn document_key(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }

    fn index_key(&self) -> String {
        format!("{}index", self.key_prefix)
    }

    fn sequence_key(&self) -> String {
        format!("{}seq", self.key_prefix)
    }
}

fn document_id(sequence: u64, nonce: Uuid) -> String {
    format!("{:020}-{}", sequence, nonce)
}

#[async_trait]
impl MessageStore for RedisMessageStore {
    async fn list_messages(&self) -> Result<Vec<Turn>, ChatError> {
        let mut conn = self.get_connection().await?;
        let ids: Vec<String> = conn.zrange(self.index_key(), 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids
            .iter()
            .map(|id| self.document_key(id))
            .collect();
        let documents: Vec<Option<String>> = conn.mget(&keys).await?;

        let mut turns = Vec::with_capacity(ids.len());
        for (id, document) in ids.into_iter().zip(documents) {
            let Some(json) = document else {
                warn!("Index entry {} has no document, skipping", id);
                continue;
            };
            match serde_json::from_str::<Turn>(&json) {
                Ok(mut turn) => {
                    turn.id = Some(id);
                    turns.push(turn);
                }
                Err(e) => {
                    error!("Error parsing stored message {}: {}", id, e);
                }
            }
        }
        Ok(turns)
    }

    async fn add_message(&self, turn: &Turn) -> Result<String, ChatError> {
        let mut conn = self.get_connection().await?;
        let sequence: u64 = conn.incr(self.sequence_key(), 1).await?;
        let id = document_id(sequence, Uuid::new_v4());

        let mut stored = turn.clone();
        stored.id = None;
        let json = serde_json::to_string(&stored).map_err(|e| ChatError::Persistence(e.to_string()))?;

        let _: () = redis
            ::pipe()
            .atomic()
            .set(self.document_key(&id), json)
            .ignore()
            .zadd(self.index_key(), &id, timestamp_score(turn))
            .ignore()
            .query_async(&mut conn).await?;
        Ok(id)
    }

    async fn delete_message(&self, id: &str) -> Result<(), ChatError> {
        let mut conn = self.get_connection().await?;
        let _: () = redis
            ::pipe()
            .atomic()
            .del(self.document_key(id))
            .ignore()
            .zrem(self.index_key(), id)
            .ignore()
            .query_async(&mut conn).await?;
        Ok(())
    }

    async fn clear_messages(&self) -> Result<usize, ChatError> {
        let mut conn = self.get_connection().await?;
        let ids: Vec<String> = conn.zrange(self.index_key(), 0, -1).await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for id in &ids {
            pipe.del(self.document_key(id)).ignore();
        }
        pipe.del(self.index_key()).ignore();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(ids.len())
    }
}
