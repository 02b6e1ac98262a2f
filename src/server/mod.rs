pub mod api;
pub mod page;
pub mod websocket;

use crate::agent::ChatAgent;
use crate::cli::Args;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

const DEFAULT_WS_PORT: u16 = 4000;

pub struct Server {
    agent: Arc<ChatAgent>,
    args: Args,
}

impl Server {
    pub fn new(agent: Arc<ChatAgent>, args: Args) -> Self {
        Self { agent, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.start_http_server().await?;
        self.start_ws_server().await?;

        Ok(())
    }

    async fn start_http_server(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = format!("{}:{}", self.args.http_host, self.args.http_port).parse::<SocketAddr>()?;
        let ws_port = self.args.ws_port().unwrap_or(DEFAULT_WS_PORT);
        api::start_http_server(addr, Arc::clone(&self.agent), ws_port).await
    }

    async fn start_ws_server(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        websocket::start_ws_server(
            &self.args.server_addr,
            Arc::clone(&self.agent),
            self.args.max_message_size,
        ).await
    }
}
