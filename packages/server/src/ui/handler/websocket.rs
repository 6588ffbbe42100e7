//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    http::{HeaderMap, header},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, PlayerConnection},
    ui::{session::ConnectionSession, state::AppState},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if !state.config.is_origin_allowed(origin.as_deref()) {
        tracing::warn!("Rejecting WebSocket from origin {:?}", origin);
        return ws.on_upgrade(reject_socket);
    }

    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Complete the handshake, then close with a policy-violation code.
async fn reject_socket(mut socket: WebSocket) {
    let close = Message::Close(Some(CloseFrame {
        code: close_code::POLICY,
        reason: "Origin not allowed".into(),
    }));
    if let Err(e) = socket.send(close).await {
        tracing::debug!("Failed to send policy close frame: {}", e);
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound frames for this client, from its own session and from its peer's
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection = PlayerConnection::new(ConnectionId::generate(), tx);
    let connection_id = connection.id;
    let mut session = ConnectionSession::new(&state, connection);
    tracing::info!("Connection '{}' opened", connection_id);

    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let msg = match incoming {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        tracing::debug!("Received from '{}': {}", connection_id, text.as_str());
                        session.handle_frame(text.as_str()).await;
                    }
                    Message::Close(_) => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    Message::Binary(_) => {
                        tracing::debug!("Ignoring binary frame from '{}'", connection_id);
                    }
                    // Ping/pong is handled automatically by the WebSocket protocol
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    session.close().await;
    tracing::info!("Connection '{}' closed", connection_id);
}
