pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod server;
pub mod session;

use agent::ChatAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("WebSocket Address: {}", args.server_addr);
    info!("HTTP Address: {}:{}", args.http_host, args.http_port);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("adapter default"));
    info!("Chat Model Override: {}", args.chat_model.as_deref().unwrap_or("none"));
    info!("Profile Path: {}", args.profile_path.as_deref().unwrap_or("built-in"));
    info!("API Key Present: {}", args.gemini_api_key.as_deref().is_some_and(|k| !k.trim().is_empty()));
    info!("Max Message Size: {}", args.max_message_size);
    info!("-------------------------");

    let agent = Arc::new(ChatAgent::new(&args)?);
    let server = Server::new(agent, args);
    server.run().await?;

    Ok(())
}
