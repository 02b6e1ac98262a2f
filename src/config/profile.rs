use serde::{ Deserialize, Serialize };
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;

use super::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-002";

const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a detailed and professional data analyst, and your job is to only provide insights/answers based on the following websites: \
https://www.airlinequality.com/airline-reviews/british-airways/?sortby=post_date%3ADesc&pagesize=200000, \
https://www.airlinequality.com/seat-reviews/british-airways/?sortby=post_date%3ADesc&pagesize=200000, and \
https://www.airlinequality.com/lounge-reviews/british-airways/?sortby=post_date%3ADesc&pagesize=200000.";

/// Sampling parameters sent with every request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSettings {
    pub model_name: String,
    pub system_instruction: String,
    pub generation: GenerationConfig,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            generation: GenerationConfig::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    pub label: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PageSettings {
    pub title: String,
    pub greeting: String,
    pub input_label: String,
    pub placeholder: String,
    pub reference_sites: Vec<ReferenceSite>,
}

impl Default for PageSettings {
    fn default() -> Self {
        let site = |label: &str, url: &str| ReferenceSite {
            label: label.to_string(),
            url: url.to_string(),
        };
        Self {
            title: "Generative AI Chatbot for Analysis Customer Review".to_string(),
            greeting: "Hi there! 👋 I’m here to help you analyze customer reviews from".to_string(),
            input_label: "Type insights".to_string(),
            placeholder: "Type your question here...".to_string(),
            reference_sites: vec![
                site(
                    "Airline Website",
                    "https://www.airlinequality.com/airline-reviews/british-airways/"
                ),
                site("Seat Website", "https://www.airlinequality.com/seat-reviews/british-airways/"),
                site(
                    "Lounge Website",
                    "https://www.airlinequality.com/lounge-reviews/british-airways/"
                ),
            ],
        }
    }
}

/// Static configuration for the chatbot: which model to call, how to call it
/// and what the page around it says.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ChatProfile {
    pub model: ModelSettings,
    pub page: PageSettings,
}

impl ChatProfile {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let model = &self.model;
        let generation = &model.generation;

        if model.model_name.trim().is_empty() {
            return Err(ConfigError::Invalid("model.model_name must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(
                ConfigError::Invalid(
                    format!("generation.temperature {} outside 0.0..=2.0", generation.temperature)
                )
            );
        }
        if !(0.0..=1.0).contains(&generation.top_p) {
            return Err(
                ConfigError::Invalid(format!("generation.top_p {} outside 0.0..=1.0", generation.top_p))
            );
        }
        if generation.top_k == 0 {
            return Err(ConfigError::Invalid("generation.top_k must be at least 1".to_string()));
        }
        if generation.max_output_tokens == 0 {
            return Err(
                ConfigError::Invalid("generation.max_output_tokens must be at least 1".to_string())
            );
        }
        Ok(())
    }
}

pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<Arc<ChatProfile>, ConfigError> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let profile: ChatProfile = serde_json
        ::from_str(&file_content)
        .map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    profile.validate()?;
    info!("Loaded chat profile from {} (model={})", path.display(), profile.model.model_name);
    Ok(Arc::new(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_profile_matches_reference_settings() {
        let profile = ChatProfile::default();
        assert_eq!(profile.model.model_name, "gemini-1.5-pro-002");
        assert_eq!(profile.model.generation.temperature, 0.2);
        assert_eq!(profile.model.generation.top_p, 0.95);
        assert_eq!(profile.model.generation.top_k, 40);
        assert_eq!(profile.model.generation.max_output_tokens, 8192);
        assert_eq!(profile.page.reference_sites.len(), 3);
        assert_eq!(profile.model.system_instruction.matches("airlinequality.com").count(), 3);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let file = write_temp(
            r#"{ "model": { "model_name": "gemini-test", "generation": { "temperature": 0.9 } } }"#
        );
        let profile = load_profile(file.path()).unwrap();

        assert_eq!(profile.model.model_name, "gemini-test");
        assert_eq!(profile.model.generation.temperature, 0.9);
        assert_eq!(profile.model.generation.top_k, 40);
        assert_eq!(profile.page, PageSettings::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let file = write_temp(r#"{ "model": { "generation": { "top_p": 1.5 } } }"#);
        let err = load_profile(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_temp("{ not json");
        let err = load_profile(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_profile("/nonexistent/review-chat/profile.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/review-chat/profile.json"));
    }
}
