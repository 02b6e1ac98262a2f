pub mod chat;

use crate::config::profile::ModelSettings;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: ModelSettings,
}
