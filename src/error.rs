use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };
use thiserror::Error;

use crate::llm::LlmError;
use crate::models::chat::ErrorResponse;

/// Body text of every failed `/api/chat` response; no detail is exposed.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Failure kinds observed while handling a conversation.
///
/// Every kind collapses into the same generic response for the user; the tag
/// only records which path fired.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider error: {0}")]
    Provider(#[from] LlmError),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl ChatError {
    pub fn kind(&self) -> ChatErrorKind {
        match self {
            ChatError::Network(_) => ChatErrorKind::Network,
            ChatError::Provider(_) => ChatErrorKind::Provider,
            ChatError::Persistence(_) => ChatErrorKind::Persistence,
            ChatError::MalformedRequest(_) => ChatErrorKind::MalformedRequest,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatErrorKind {
    Network,
    Provider,
    Persistence,
    MalformedRequest,
}

impl From<redis::RedisError> for ChatError {
    fn from(err: redis::RedisError) -> Self {
        ChatError::Persistence(err.to_string())
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: INTERNAL_SERVER_ERROR.to_string(),
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
