use crate::agent::ChatAgent;
use super::page;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::get,
    Router,
    extract::State,
    http::StatusCode,
    response::{ Html, IntoResponse },
    Json,
};
use serde::Serialize;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

#[derive(Serialize)]
struct StatusResponse {
    configured: bool,
    model: String,
    error: Option<String>,
}

#[derive(Clone)]
struct AppState {
    agent: Arc<ChatAgent>,
    ws_port: u16,
}

pub fn router(agent: Arc<ChatAgent>, ws_port: u16) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .layer(cors)
        .with_state(AppState { agent, ws_port })
}

pub async fn start_http_server(
    addr: SocketAddr,
    agent: Arc<ChatAgent>,
    ws_port: u16,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
        e
    })?;
    info!("Starting HTTP page server on: http://{}", addr);

    let app = router(agent, ws_port);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app.into_make_service()).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("HTTP server started");
    Ok(())
}

async fn index_handler(State(state): State<AppState>) -> impl IntoResponse {
    match page::render_index(&state.agent, state.ws_port) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        configured: state.agent.is_configured(),
        model: state.agent.model_name(),
        error: state.agent.config_error().map(str::to_string),
    })
}
