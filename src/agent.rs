use crate::cli::Args;
use crate::config::{ resolve_api_key, ConfigError };
use crate::config::profile::{ self, ChatProfile };
use crate::llm::LlmConfig;
use crate::llm::chat::{ ChatClient, new_client as new_chat_client };
use crate::session::ChatSession;

use log::{ info, error };
use std::error::Error;
use std::sync::Arc;

/// Shared, read-only state behind every connection: the profile and, when an
/// API key was configured, the chat client that sessions talk to.
#[derive(Clone)]
pub struct ChatAgent {
    chat_client: Option<Arc<dyn ChatClient>>,
    profile: Arc<ChatProfile>,
    config_error: Option<String>,
}

impl ChatAgent {
    fn load_profile(args: &Args) -> Result<Arc<ChatProfile>, Box<dyn Error + Send + Sync>> {
        let mut profile = match &args.profile_path {
            Some(path) => (*profile::load_profile(path)?).clone(),
            None => {
                info!("No profile file configured, using built-in profile.");
                ChatProfile::default()
            }
        };
        if let Some(model) = args.chat_model.as_ref().filter(|m| !m.trim().is_empty()) {
            profile.model.model_name = model.clone();
        }
        profile.validate()?;
        Ok(Arc::new(profile))
    }

    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let profile = Self::load_profile(args)?;

        let api_key = match resolve_api_key(args.gemini_api_key.as_deref()) {
            Ok(key) => key,
            Err(e) => {
                error!("{}", e);
                return Ok(Self::unconfigured(profile, e));
            }
        };

        let chat_config = LlmConfig {
            api_key,
            base_url: args.chat_base_url.clone(),
            model: profile.model.clone(),
        };
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Model={}, BaseURL={:?}",
            chat_config.model.model_name,
            chat_config.base_url.as_deref().unwrap_or("adapter default")
        );

        Ok(Self::with_client(profile, chat_client))
    }

    pub fn with_client(profile: Arc<ChatProfile>, chat_client: Arc<dyn ChatClient>) -> Self {
        Self {
            chat_client: Some(chat_client),
            profile,
            config_error: None,
        }
    }

    pub fn unconfigured(profile: Arc<ChatProfile>, err: ConfigError) -> Self {
        Self {
            chat_client: None,
            profile,
            config_error: Some(err.to_string()),
        }
    }

    pub fn profile(&self) -> &ChatProfile {
        &self.profile
    }

    pub fn is_configured(&self) -> bool {
        self.chat_client.is_some()
    }

    pub fn config_error(&self) -> Option<&str> {
        self.config_error.as_deref()
    }

    pub fn model_name(&self) -> String {
        match &self.chat_client {
            Some(client) => client.get_model(),
            None => self.profile.model.model_name.clone(),
        }
    }

    /// Starts a fresh, empty session. Refused when no API key was configured.
    pub fn new_session(&self) -> Result<ChatSession, ConfigError> {
        match &self.chat_client {
            Some(client) => Ok(ChatSession::new(Arc::clone(client))),
            None => Err(ConfigError::MissingApiKey),
        }
    }
}
