#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{ AtomicBool, AtomicUsize, Ordering };
use std::sync::{ Arc, Mutex };
use tokio::sync::Notify;
use webgpt_chat::conversation::client::ChatApi;
use webgpt_chat::error::ChatError;
use webgpt_chat::history::{ MemoryMessageStore, MessageStore };
use webgpt_chat::llm::chat::{ ChatClient, ChatSession };
use webgpt_chat::llm::LlmError;
use webgpt_chat::models::chat::Turn;

/// Provider double that records every session it is handed.
#[derive(Default)]
pub struct RecordingChatClient {
    pub calls: Mutex<Vec<(ChatSession, String)>>,
    pub fail: bool,
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((session.clone(), message.to_string()));
        if self.fail {
            return Err(LlmError::Blocked("SAFETY".into()));
        }
        Ok("provider output".into())
    }

    fn get_model(&self) -> String {
        "recording-model".into()
    }
}

/// Gateway double. When `gated`, each call waits for `release` before replying.
#[derive(Default)]
pub struct ScriptedChatApi {
    pub requests: Mutex<Vec<Vec<Turn>>>,
    pub calls: AtomicUsize,
    pub fail: bool,
    pub gated: bool,
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl ChatApi for ScriptedChatApi {
    async fn post_chat(&self, messages: &[Turn]) -> Result<Turn, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        if self.fail {
            return Err(ChatError::Network("connection refused".into()));
        }
        Ok(Turn::model(format!("reply #{}", self.calls.load(Ordering::SeqCst))))
    }
}

/// Memory store whose writes can be switched off.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryMessageStore,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

#[async_trait]
impl MessageStore for FlakyStore {
    async fn list_messages(&self) -> Result<Vec<Turn>, ChatError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ChatError::Persistence("read unavailable".into()));
        }
        self.inner.list_messages().await
    }

    async fn add_message(&self, turn: &Turn) -> Result<String, ChatError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ChatError::Persistence("write unavailable".into()));
        }
        self.inner.add_message(turn).await
    }

    async fn delete_message(&self, id: &str) -> Result<(), ChatError> {
        self.inner.delete_message(id).await
    }

    async fn clear_messages(&self) -> Result<usize, ChatError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ChatError::Persistence("read unavailable".into()));
        }
        self.inner.clear_messages().await
    }
}

/// Store that keeps raw JSON documents behind an id index, the way the Redis
/// backend does. Documents that do not parse are skipped when listing.
#[derive(Default)]
pub struct RawDocumentStore {
    documents: Mutex<Vec<(String, String)>>,
}

impl RawDocumentStore {
    pub fn insert_raw(&self, id: &str, json: &str) {
        self.documents.lock().unwrap().push((id.to_string(), json.to_string()));
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

#[async_trait]
impl MessageStore for RawDocumentStore {
    async fn list_messages(&self) -> Result<Vec<Turn>, ChatError> {
        let documents = self.documents.lock().unwrap();
        Ok(
            documents
                .iter()
                .filter_map(|(id, json)| {
                    let mut turn = serde_json::from_str::<Turn>(json).ok()?;
                    turn.id = Some(id.clone());
                    Some(turn)
                })
                .collect()
        )
    }

    async fn add_message(&self, turn: &Turn) -> Result<String, ChatError> {
        let mut documents = self.documents.lock().unwrap();
        let id = format!("doc-{}", documents.len());
        let json = serde_json::to_string(turn).map_err(|e| ChatError::Persistence(e.to_string()))?;
        documents.push((id.clone(), json));
        Ok(id)
    }

    async fn delete_message(&self, id: &str) -> Result<(), ChatError> {
        self.documents.lock().unwrap().retain(|(doc_id, _)| doc_id != id);
        Ok(())
    }

    async fn clear_messages(&self) -> Result<usize, ChatError> {
        let mut documents = self.documents.lock().unwrap();
        let removed = documents.len();
        documents.clear();
        Ok(removed)
    }
}

pub fn flaky_store() -> Arc<FlakyStore> {
    Arc::new(FlakyStore::default())
}
