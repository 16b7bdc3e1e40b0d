use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::sync::Arc;
use log::info;

use crate::llm::GenerationConfig;

pub const SYSTEM_INSTRUCTION: &str =
    "너의 이름은 웹지피티고 나의 AI 비서야. 비서긴 하지만 어딘가 모자라 보이는 부분이 있게끔 연기해줘. 내가 고민을 말하면 해결책을 제시해줘. 존대말로 대답해줘.";

/// Text of the synthetic turn that opens a history starting with a model turn.
pub const OPENING_USER_TEXT: &str = "안녕하세요";

pub const GREETING_TEXT: &str = "자유롭게 지피티와의 대화를 시작해주세요";

/// Persona and generation settings for the completion gateway.
///
/// Every key is optional in the prompt file; absent keys keep their defaults.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_instruction: String,
    pub opening_user_text: String,
    pub greeting_text: String,
    pub generation: GenerationConfig,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            opening_user_text: OPENING_USER_TEXT.to_string(),
            greeting_text: GREETING_TEXT.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

pub fn load_prompts(path: &str) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    let file_content = fs
        ::read_to_string(path)
        .map_err(|e| format!("Failed to read prompts file '{}': {}", path, e))?;
    let config: PromptConfig = serde_json
        ::from_str(&file_content)
        .map_err(|e| format!("Failed to parse prompts file '{}': {}", path, e))?;
    Ok(Arc::new(config))
}

pub fn resolve_prompts(
    path: Option<&str>
) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    match path.filter(|p| !p.trim().is_empty()) {
        Some(p) => {
            info!("Loading prompt configuration from {}", p);
            load_prompts(p)
        }
        None => Ok(Arc::new(PromptConfig::default())),
    }
}
