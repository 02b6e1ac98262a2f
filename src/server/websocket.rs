use crate::agent::ChatAgent;
use crate::models::websocket::{ ClientMessage, ServerMessage };
use crate::session::{ ChatSession, SubmitOutcome };

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::SplitSink;
use futures::{ SinkExt, StreamExt };
use log::{ info, warn, error };
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::net::TcpListener;
use tokio_tungstenite::{ accept_async, WebSocketStream };
use tokio_tungstenite::tungstenite::protocol::Message;

type WsSink<S> = SplitSink<WebSocketStream<S>, Message>;

pub async fn start_ws_server(
    addr: &str,
    agent: Arc<ChatAgent>,
    max_message_size: usize,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("WS server listening on: {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        info!("Incoming connection from: {}", peer);
        let agent_clone = Arc::clone(&agent);

        tokio::spawn(async move {
            match accept_async(stream).await {
                Ok(ws) => handle_connection(peer, ws, agent_clone, max_message_size).await,
                Err(e) => error!("Handshake failed for {}: {}", peer, e),
            }
        });
    }
}

async fn send_message<S>(tx: &mut WsSink<S>, msg: &ServerMessage) -> Result<(), Box<dyn Error + Send + Sync>>
    where S: AsyncRead + AsyncWrite + Unpin
{
    let json = serde_json::to_string(msg)?;
    tx.send(Message::Text(json)).await?;
    Ok(())
}

fn transcript_message(session: &ChatSession) -> ServerMessage {
    ServerMessage::Transcript {
        lines: session.transcript(),
        timestamp: Utc::now().timestamp(),
    }
}

/// Runs one chat submission and pushes the outcome back: an error banner when
/// the call failed, then always the full transcript.
async fn handle_chat<S>(
    peer: SocketAddr,
    tx: &mut WsSink<S>,
    session: &mut ChatSession,
    content: &str
) -> Result<(), Box<dyn Error + Send + Sync>>
    where S: AsyncRead + AsyncWrite + Unpin
{
    if content.trim().is_empty() {
        return send_message(tx, &transcript_message(session)).await;
    }

    send_message(tx, &ServerMessage::Processing).await?;

    match session.submit(content).await {
        Ok(SubmitOutcome::Answered(_)) | Ok(SubmitOutcome::Ignored) => {}
        Err(e) => {
            error!("Chat processing error for {}: {}", peer, e);
            send_message(tx, &ServerMessage::Error { message: e.to_string() }).await?;
        }
    }

    send_message(tx, &transcript_message(session)).await
}

pub async fn handle_connection<S>(
    peer: SocketAddr,
    websocket: WebSocketStream<S>,
    agent: Arc<ChatAgent>,
    max_message_size: usize
)
    where S: AsyncRead + AsyncWrite + Unpin
{
    info!("New WebSocket connection: {}", peer);
    let (mut tx, mut rx) = websocket.split();

    let mut session = match agent.new_session() {
        Ok(session) => session,
        Err(e) => {
            warn!("Rejecting chat for {}: {}", peer, e);
            let msg = ServerMessage::ConfigError { message: e.to_string() };
            if let Err(e) = send_message(&mut tx, &msg).await {
                error!("Failed to send configuration error to {}: {}", peer, e);
            }
            let _ = tx.send(Message::Close(None)).await;
            return;
        }
    };
    info!("Assigned session ID {} to {}", session.id(), peer);

    if let Err(e) = send_message(&mut tx, &transcript_message(&session)).await {
        error!("Failed to send initial transcript to {}: {}", peer, e);
        return;
    }

    while let Some(msg) = rx.next().await {
        match msg {
            Ok(message) => {
                if message.len() > max_message_size {
                    warn!(
                        "Message from {} exceeds size limit ({} > {})",
                        peer,
                        message.len(),
                        max_message_size
                    );
                    let error_msg = ServerMessage::Error {
                        message: "Message too large".to_string(),
                    };
                    if send_message(&mut tx, &error_msg).await.is_err() {
                        error!("Failed to send size limit error to {}", peer);
                    }
                    break;
                }

                match message {
                    Message::Text(text) => {
                        let result = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Chat { content }) => {
                                handle_chat(peer, &mut tx, &mut session, &content).await
                            }
                            Err(e) => {
                                error!("Failed to parse message from {}: {}", peer, e);
                                let error_msg = ServerMessage::Error {
                                    message: format!("Failed to parse message: {}", e),
                                };
                                send_message(&mut tx, &error_msg).await
                            }
                        };
                        if let Err(e) = result {
                            error!("Error sending message to {}: {}", peer, e);
                            break;
                        }
                    }
                    Message::Close(_) => {
                        info!("Received close frame from {}", peer);
                        break;
                    }
                    Message::Ping(ping_data) => {
                        if tx.send(Message::Pong(ping_data)).await.is_err() {
                            error!("Failed to send pong to {}", peer);
                            break;
                        }
                    }
                    Message::Binary(_) => {
                        warn!("Ignoring binary message from {}", peer);
                    }
                    Message::Pong(_) | Message::Frame(_) => {}
                }
            }
            Err(e) => {
                match e {
                    | tokio_tungstenite::tungstenite::Error::ConnectionClosed
                    | tokio_tungstenite::tungstenite::Error::Protocol(_)
                    | tokio_tungstenite::tungstenite::Error::Utf8 => {
                        info!("WebSocket connection closed or protocol error for {}: {}", peer, e);
                    }
                    tokio_tungstenite::tungstenite::Error::Io(ref io_err) if
                        io_err.kind() == std::io::ErrorKind::ConnectionReset
                    => {
                        info!("WebSocket connection reset by peer {}", peer);
                    }
                    _ => {
                        error!("Error receiving message from {}: {}", peer, e);
                    }
                }
                break;
            }
        }
    }
    info!(
        "WebSocket connection closed for {} (session {}, {} turns)",
        peer,
        session.id(),
        session.log().len()
    );
}
