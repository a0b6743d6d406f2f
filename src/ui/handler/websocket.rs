//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::ConnectionId,
    infrastructure::dto::websocket::{AckEvent, ClientEvent, ServerEvent},
    ui::state::AppState,
    usecase::{
        DisconnectUseCase, HubError, JoinRoomUseCase, LeaveRoomUseCase, SendMessageUseCase,
        TypingUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Register the transport session and attach its outbound channel
    let (tx, mut rx) = mpsc::unbounded_channel();
    let connection_id = {
        let mut registry = state.registry.lock().await;
        registry.register()
    };
    state.router.attach(connection_id, tx).await;
    tracing::info!("Connection '{}' established", connection_id);

    // Spawn a task to pump routed frames out to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // Spawn a task to receive and dispatch frames from this client
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    dispatch_frame(&recv_state, connection_id, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Transport closed: destroy the registry entry and notify the room
    DisconnectUseCase::new(state.registry.clone(), state.router.clone())
        .execute(connection_id)
        .await;
    tracing::info!("Connection '{}' closed", connection_id);
}

/// Parse one inbound frame and run the matching lifecycle transition.
///
/// Acknowledgments travel over the connection's own outbound channel, after
/// every broadcast the transition produced.
async fn dispatch_frame(state: &Arc<AppState>, connection_id: ConnectionId, text: &str) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Failed to parse frame from '{}': {}", connection_id, e);
            let ack = error_ack(&HubError::Validation("Malformed event frame".to_string()));
            state.router.to_connection(connection_id, &ack).await;
            return;
        }
    };

    match event {
        ClientEvent::Join(payload) => {
            let usecase = JoinRoomUseCase::new(
                state.registry.clone(),
                state.catalog.clone(),
                state.store.clone(),
                state.router.clone(),
            );
            let ack = match usecase.execute(connection_id, payload).await {
                Ok(()) => ServerEvent::Ack(AckEvent::ok()),
                Err(e) => {
                    tracing::warn!("Join failed for '{}': {}", connection_id, e);
                    error_ack(&e)
                }
            };
            state.router.to_connection(connection_id, &ack).await;
        }
        ClientEvent::SendMessage(payload) => {
            let usecase = SendMessageUseCase::new(
                state.registry.clone(),
                state.store.clone(),
                state.router.clone(),
            );
            let ack = match usecase.execute(connection_id, payload).await {
                Ok(()) => ServerEvent::Ack(AckEvent::ok()),
                Err(e) => {
                    tracing::warn!("Send failed for '{}': {}", connection_id, e);
                    error_ack(&e)
                }
            };
            state.router.to_connection(connection_id, &ack).await;
        }
        ClientEvent::Typing(payload) => {
            // Fire-and-forget: no acknowledgment
            TypingUseCase::new(state.router.clone())
                .execute(connection_id, payload)
                .await;
        }
        ClientEvent::LeaveRoom(payload) => {
            tracing::debug!(
                "'{}' leaving room '{}' on connection '{}'",
                payload.username,
                payload.room,
                connection_id
            );
            LeaveRoomUseCase::new(state.registry.clone(), state.router.clone())
                .execute(connection_id)
                .await;
            // Leave is idempotent and always acknowledged as success
            state
                .router
                .to_connection(connection_id, &ServerEvent::Ack(AckEvent::ok()))
                .await;
        }
    }
}

fn error_ack(error: &HubError) -> ServerEvent {
    ServerEvent::Ack(AckEvent::error(error.kind(), error.to_string()))
}
