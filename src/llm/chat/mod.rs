pub mod gemini;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use self::gemini::GeminiChatClient;
use super::{ GenerationConfig, LlmConfig, LlmError };
use crate::models::chat::{ Part, Role, Turn };

/// Provider-bound message: only the fields the provider accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl From<Turn> for Content {
    fn from(turn: Turn) -> Self {
        Self {
            role: turn.role,
            parts: turn.parts,
        }
    }
}

/// Prior context handed to the provider together with the next message.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub system_instruction: String,
    pub generation_config: GenerationConfig,
    pub history: Vec<Content>,
}

impl ChatSession {
    pub fn new(
        system_instruction: impl Into<String>,
        generation_config: GenerationConfig,
        history: Vec<Content>
    ) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            generation_config,
            history,
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `message` as the next user turn after the session history and
    /// returns the reply text.
    async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String, LlmError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, LlmError> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
