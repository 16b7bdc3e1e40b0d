pub mod chat;
use serde::{ Deserialize, Serialize };
use thiserror::Error;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("provider returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },

    #[error("response blocked by provider: {0}")]
    Blocked(String),

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Unreachable(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_output_tokens: 100,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}
