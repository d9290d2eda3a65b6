//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};

use crate::{
    domain::ConnectionId,
    infrastructure::transport::split_socket,
    ui::state::AppState,
    usecase::{ConnectionSession, SessionEnd},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let id = ConnectionId::generate();
    tracing::debug!("Upgrading connection '{}'", id);

    ws.on_failed_upgrade(move |e| {
        tracing::warn!("WebSocket upgrade for '{}' failed: {}", id, e);
    })
    .on_upgrade(move |socket| handle_socket(socket, state, id))
}

/// Run one session on an upgraded socket until the connection is gone.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, id: ConnectionId) {
    let (handle, reader) = split_socket(socket);

    let session = ConnectionSession::new(
        id,
        handle,
        reader,
        state.join_member_usecase.clone(),
        state.relay_message_usecase.clone(),
        state.leave_member_usecase.clone(),
    );
    let outcome = session.run().await;

    match &outcome.end {
        SessionEnd::HandshakeFailed(e) => {
            tracing::debug!("Connection '{}' dropped before joining: {}", id, e);
        }
        SessionEnd::Disconnected(_) | SessionEnd::Rejected(_) => {
            tracing::info!(
                "Connection '{}' closed after relaying {} message(s)",
                id,
                outcome.relayed
            );
        }
    }
}
