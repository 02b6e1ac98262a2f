pub mod gemini;
#[cfg(test)]
pub mod scripted;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use self::gemini::GeminiChatClient;
use crate::models::chat::Role;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentPart {
    pub text: String,
}

/// One entry of the history handed to the provider: an author and its text parts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatContent {
    pub role: Role,
    pub parts: Vec<ContentPart>,
}

impl ChatContent {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ContentPart { text: text.into() }],
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat request failed: {0}")] Http(#[from] reqwest::Error),
    #[error("chat API returned {status}: {message}")] Api {
        status: u16,
        message: String,
    },
    #[error("response blocked by the model: {0}")] Blocked(String),
    #[error("invalid chat client configuration: {0}")] Config(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `message` on top of `history` and returns the generated text.
    async fn send_message(
        &self,
        history: &[ChatContent],
        message: &str
    ) -> Result<CompletionResponse, ChatError>;

    fn get_model(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
