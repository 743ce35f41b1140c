pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::state::AppState;
use crate::types::{ConnectionId, ParticipantId};

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Participant id returned by registration, to bind at accept time
    pub id: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!("WebSocket connection request: id={:?}", params.id);

    let identity = params.id.as_deref().and_then(|raw| {
        let parsed = ParticipantId::parse(raw);
        if parsed.is_none() {
            tracing::warn!(id = raw, "Ignoring malformed participant id");
        }
        parsed
    });

    ws.on_upgrade(move |socket| handle_socket(socket, identity, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, identity: Option<ParticipantId>, state: Arc<AppState>) {
    let (sink, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let connection_id = match state.admit(tx.clone(), identity).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to admit connection: {}", e);
            return;
        }
    };

    // Writer ends once every sender is gone or the socket rejects a write
    tokio::spawn(writer_task(connection_id, sink, rx));

    loop {
        let next = match state.config.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!(connection = %connection_id, "Closing idle connection");
                    state.mark_closing(&connection_id).await;
                    let _ = tx.send(Message::Close(None));
                    break;
                }
            },
            None => receiver.next().await,
        };

        match next {
            Some(Ok(Message::Close(_))) => {
                tracing::info!(connection = %connection_id, "WebSocket closed");
                state.mark_closing(&connection_id).await;
                break;
            }
            Some(Ok(Message::Ping(data))) => {
                if tx.send(Message::Pong(data)).is_err() {
                    break;
                }
            }
            Some(Ok(Message::Pong(_))) => {}
            Some(Ok(message)) => {
                if let Err(e) = handlers::handle_frame(message, &state).await {
                    tracing::debug!(connection = %connection_id, "Dropped frame: {}", e);
                }
            }
            Some(Err(e)) => {
                tracing::warn!(connection = %connection_id, "WebSocket error: {}", e);
                break;
            }
            None => break,
        }
    }

    state.remove_connection(&connection_id).await;
    tracing::info!(connection = %connection_id, "WebSocket connection closed");
}

/// Drain the connection's outbound queue into the socket
async fn writer_task(
    connection_id: ConnectionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            tracing::debug!(connection = %connection_id, "Write failed: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
}
