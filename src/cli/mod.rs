use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// API key for the Gemini generative language API. Without it the page
    /// shows a configuration error and no requests are made.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Base URL of the generative language API (e.g., https://generativelanguage.googleapis.com/v1beta)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, the Gemini client picks the public endpoint
    pub chat_base_url: Option<String>,

    /// Model name override (e.g., gemini-1.5-pro-002). Takes precedence over the profile.
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Path to a JSON profile with the system instruction, generation parameters and page text.
    #[arg(long, env = "PROFILE_PATH")]
    pub profile_path: Option<String>,

    // --- Server Args ---
    /// Host address and port for the WebSocket chat server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Host the HTTP page server binds to.
    #[arg(long, env = "HTTP_HOST", default_value = "127.0.0.1")]
    pub http_host: String,

    /// Port for the HTTP page server.
    #[arg(long, env = "HTTP_PORT", default_value = "8501")]
    pub http_port: u16,

    /// Largest WebSocket message accepted from a client, in bytes.
    #[arg(long, env = "MAX_MESSAGE_SIZE", default_value = "1048576")]
    pub max_message_size: usize,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    /// Port half of `server_addr`, handed to the page so it can open the socket.
    pub fn ws_port(&self) -> Option<u16> {
        self.server_addr.rsplit_once(':').and_then(|(_, port)| port.parse().ok())
    }
}
