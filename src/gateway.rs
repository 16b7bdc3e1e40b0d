use chrono::{ DateTime, Utc };
use log::{ info, error };
use std::sync::Arc;

use crate::config::prompt::PromptConfig;
use crate::error::ChatError;
use crate::llm::chat::{ ChatClient, ChatSession, Content };
use crate::models::chat::{ Role, Turn };

/// Message that asks the provider to continue; the user's input is already the
/// last entry of the history.
const TRIGGER_MESSAGE: &str = "";

/// Repairs a client-submitted history so the provider accepts it.
///
/// A non-empty history that does not open with a user turn gets a synthetic
/// user greeting prepended. Timestamps and store ids never reach the provider.
pub fn normalize_history(
    mut messages: Vec<Turn>,
    opening_user_text: &str,
    now: DateTime<Utc>
) -> Vec<Content> {
    if let Some(first) = messages.first() {
        if first.role != Role::User {
            messages.insert(0, Turn::user(opening_user_text).with_timestamp(now));
        }
    }
    messages.into_iter().map(Content::from).collect()
}

/// Turns a conversation into one provider call and returns the reply turn.
#[derive(Clone)]
pub struct CompletionGateway {
    chat_client: Arc<dyn ChatClient>,
    prompts: Arc<PromptConfig>,
}

impl CompletionGateway {
    pub fn new(chat_client: Arc<dyn ChatClient>, prompts: Arc<PromptConfig>) -> Self {
        Self { chat_client, prompts }
    }

    pub fn model(&self) -> String {
        self.chat_client.get_model()
    }

    pub fn prompts(&self) -> &PromptConfig {
        &self.prompts
    }

    pub async fn complete(&self, messages: Vec<Turn>) -> Result<Turn, ChatError> {
        info!("Completing conversation of {} turn(s)", messages.len());
        let history = normalize_history(messages, &self.prompts.opening_user_text, Utc::now());
        let session = ChatSession::new(
            self.prompts.system_instruction.clone(),
            self.prompts.generation,
            history
        );

        match self.chat_client.send_message(&session, TRIGGER_MESSAGE).await {
            Ok(text) => Ok(Turn::model(text)),
            Err(e) => {
                error!("Completion provider failed: {}", e);
                Err(ChatError::Provider(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::models::chat::Part;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        sessions: Mutex<Vec<(ChatSession, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatClient for RecordingClient {
        async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String, LlmError> {
            self.sessions.lock().unwrap().push((session.clone(), message.to_string()));
            if self.fail {
                return Err(LlmError::Unreachable("connection refused".into()));
            }
            Ok("provider output".into())
        }

        fn get_model(&self) -> String {
            "recording".into()
        }
    }

    fn content(role: Role, text: &str) -> Content {
        Content { role, parts: vec![Part { text: text.into() }] }
    }

    #[test]
    fn model_first_history_gets_user_greeting() {
        let history = normalize_history(vec![Turn::model("hi")], "안녕하세요", Utc::now());
        assert_eq!(history, vec![content(Role::User, "안녕하세요"), content(Role::Model, "hi")]);
    }

    #[test]
    fn user_first_history_is_unchanged() {
        let history = normalize_history(
            vec![Turn::user("질문"), Turn::model("답")],
            "안녕하세요",
            Utc::now()
        );
        assert_eq!(history, vec![content(Role::User, "질문"), content(Role::Model, "답")]);
    }

    #[test]
    fn empty_history_stays_empty() {
        assert!(normalize_history(Vec::new(), "안녕하세요", Utc::now()).is_empty());
    }

    #[test]
    fn timestamps_and_ids_are_stripped() {
        let mut turn = Turn::user("hello").with_timestamp(Utc::now());
        turn.id = Some("doc-1".into());
        let history = normalize_history(vec![turn], "안녕하세요", Utc::now());

        let value = serde_json::to_value(&history).unwrap();
        for entry in value.as_array().unwrap() {
            assert!(entry.get("timestamp").is_none());
            assert!(entry.get("id").is_none());
        }
    }

    #[tokio::test]
    async fn complete_sends_session_with_empty_trigger() {
        let client = Arc::new(RecordingClient::default());
        let gateway = CompletionGateway::new(client.clone(), Arc::new(PromptConfig::default()));

        let reply = gateway.complete(vec![Turn::model("hi")]).await.unwrap();
        assert_eq!(reply, Turn::model("provider output"));

        let sessions = client.sessions.lock().unwrap();
        assert_eq!(sessions.len(), 1);
        let (session, message) = &sessions[0];
        assert_eq!(message, "");
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.generation_config.max_output_tokens, 100);
        assert_eq!(session.system_instruction, PromptConfig::default().system_instruction);
    }

    #[tokio::test]
    async fn provider_failure_is_tagged() {
        let client = Arc::new(RecordingClient { fail: true, ..Default::default() });
        let gateway = CompletionGateway::new(client, Arc::new(PromptConfig::default()));

        let err = gateway.complete(vec![Turn::user("hello")]).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ChatErrorKind::Provider);
    }
}
