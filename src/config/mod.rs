pub mod profile;

use thiserror::Error;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key not found. Please set GEMINI_API_KEY in the .env file.")]
    MissingApiKey,
    #[error("Failed to read profile file '{path}': {source}")] Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse profile file '{path}': {source}")] Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid profile: {0}")] Invalid(String),
}

/// Treats an absent or blank key the same way: the chat client is never built.
pub fn resolve_api_key(raw: Option<&str>) -> Result<String, ConfigError> {
    match raw.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(ConfigError::MissingApiKey),
    }
}
