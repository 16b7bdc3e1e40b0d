use async_trait::async_trait;
use log::error;

use crate::error::ChatError;
use crate::models::chat::{ ChatRequest, Turn };

/// Client side of `POST /api/chat`.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn post_chat(&self, messages: &[Turn]) -> Result<Turn, ChatError>;
}

pub struct HttpChatApi {
    http: reqwest::Client,
    url: String,
}

impl HttpChatApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn post_chat(&self, messages: &[Turn]) -> Result<Turn, ChatError> {
        let request = ChatRequest { messages: messages.to_vec() };
        let resp = self.http
            .post(&self.url)
            .json(&request)
            .send().await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            error!("Error during fetch: {}", status);
            return Err(ChatError::Network(format!("gateway returned {}", status)));
        }

        resp.json::<Turn>().await.map_err(|e| ChatError::Network(e.to_string()))
    }
}
