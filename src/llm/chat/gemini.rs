use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use log::{ info, warn };
use url::Url;

use super::{ ChatClient, ChatContent, ChatError, CompletionResponse };
use crate::config::profile::GenerationConfig;
use crate::llm::LlmConfig;
use crate::models::chat::Role;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction<'a>>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiSystemInstruction<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
}

impl<'a> From<&'a GenerationConfig> for GeminiGenerationConfig<'a> {
    fn from(config: &'a GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            response_mime_type: &config.response_mime_type,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    prompt_feedback: Option<GooglePromptFeedback>,
}

#[derive(Deserialize, Debug)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize, Debug)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize, Debug)]
struct GooglePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GooglePromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Deserialize, Debug)]
struct GoogleError {
    message: String,
}

/// Gemini only knows `user` and `model` as authors.
fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "model",
    }
}

impl GoogleResponse {
    fn into_text(self) -> Result<String, ChatError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ChatError::Blocked(reason));
        }
        let text = self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(text)
    }
}

pub struct GeminiChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: Url,
    system_instruction: String,
    generation: GenerationConfig,
}

impl GeminiChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        system_instruction: String,
        generation: GenerationConfig
    ) -> Result<Self, ChatError> {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let raw_endpoint = format!("{}/models/{}:generateContent", base.trim_end_matches('/'), model);
        let endpoint = Url::parse(&raw_endpoint).map_err(|e|
            ChatError::Config(format!("invalid Gemini endpoint '{}': {}", raw_endpoint, e))
        )?;

        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            endpoint,
            system_instruction,
            generation,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ChatError> {
        Self::new(
            config.api_key.clone(),
            config.model.model_name.clone(),
            config.base_url.clone(),
            config.model.system_instruction.clone(),
            config.model.generation.clone()
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_request<'a>(&'a self, history: &'a [ChatContent], message: &'a str) -> GeminiRequest<'a> {
        let system_instruction = if self.system_instruction.trim().is_empty() {
            None
        } else {
            Some(GeminiSystemInstruction {
                parts: vec![GeminiPart { text: &self.system_instruction }],
            })
        };

        let mut contents: Vec<GeminiContent<'a>> = history
            .iter()
            .map(|entry| GeminiContent {
                role: wire_role(entry.role),
                parts: entry.parts
                    .iter()
                    .map(|p| GeminiPart { text: &p.text })
                    .collect(),
            })
            .collect();
        contents.push(GeminiContent {
            role: wire_role(Role::User),
            parts: vec![GeminiPart { text: message }],
        });

        GeminiRequest {
            system_instruction,
            contents,
            generation_config: GeminiGenerationConfig::from(&self.generation),
        }
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn send_message(
        &self,
        history: &[ChatContent],
        message: &str
    ) -> Result<CompletionResponse, ChatError> {
        info!(
            "GeminiChatClient::send_message() → model={} history_entries={}",
            self.model,
            history.len()
        );
        let payload = self.build_request(history, message);

        let resp = self.http
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json
                ::from_str::<GoogleErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            warn!("Gemini API returned {}: {}", status, message);
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GoogleResponse = resp.json().await?;
        let text = parsed.into_text()?;
        Ok(CompletionResponse { response: text })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }
}
