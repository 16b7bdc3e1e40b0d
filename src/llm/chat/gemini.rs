use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use log::{ info, debug };

use super::{ ChatClient, ChatSession, Content };
use crate::llm::{ GenerationConfig, LlmConfig, LlmError, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL };
use crate::models::chat::{ Part, Role };

const BLOCKING_FINISH_REASONS: [&str; 5] = [
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: SystemInstruction<'a>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct SystemInstruction<'a> {
    parts: [InstructionPart<'a>; 1],
}

#[derive(Serialize, Debug)]
struct InstructionPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    content: Option<GoogleContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize, Debug)]
struct GooglePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn build_request<'a>(session: &'a ChatSession, message: &str) -> GenerateContentRequest<'a> {
    let mut contents = session.history.clone();
    contents.push(Content {
        role: Role::User,
        parts: vec![Part { text: message.to_string() }],
    });
    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: [InstructionPart { text: &session.system_instruction }],
        },
        contents,
        generation_config: session.generation_config,
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    let candidate = match response.candidates.into_iter().next() {
        Some(c) => c,
        None => {
            let reason = response.prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            return Err(LlmError::Blocked(reason));
        }
    };

    let text = candidate.content
        .map(|c|
            c.parts
                .into_iter()
                .map(|p| p.text)
                .collect::<String>()
        )
        .unwrap_or_default();

    if text.is_empty() {
        if let Some(reason) = candidate.finish_reason {
            if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) {
                return Err(LlmError::Blocked(reason));
            }
        }
    }
    Ok(text)
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiChatClient {
    pub fn new(api_key: String, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let base_url = base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Config("Google API key is required for GeminiChatClient".into()))?;

        Ok(Self::new(api_key, config.completion_model.clone(), config.base_url.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn send_message(&self, session: &ChatSession, message: &str) -> Result<String, LlmError> {
        info!(
            "GeminiChatClient::send_message() → model={} history_len={}",
            self.model,
            session.history.len()
        );
        let payload = build_request(session, message);

        let resp = self.http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        debug!("Gemini response: {:?}", parsed);
        extract_text(parsed)
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
