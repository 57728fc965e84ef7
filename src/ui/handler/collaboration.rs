//! Collaborative document room endpoint.
//!
//! One room per shopper id, named by the path. Payloads are opaque document
//! updates; the room applies each to its authoritative doc and relays it to
//! every other participant. Admission is coarse: any connection naming the
//! shopper id is accepted — clients are expected to connect only once their
//! collaboration status is `accepted`.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::ui::state::AppState;

pub async fn collaboration_handler(
    ws: WebSocketUpgrade,
    Path(shopper_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_room_socket(socket, state, shopper_id))
}

async fn handle_room_socket(socket: WebSocket, state: Arc<AppState>, shopper_id: String) {
    let room = state.collab_rooms.get_or_create(&shopper_id).await;
    let peer_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    let catch_up = room.join(peer_id, tx).await;
    tracing::info!("Peer '{}' joined document room '{}'", peer_id, shopper_id);

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Fast-forward the new peer with the accumulated document state
    if ws_sender.send(Message::Binary(catch_up.into())).await.is_err() {
        room.leave(&peer_id).await;
        state.collab_rooms.remove_if_empty(&shopper_id).await;
        return;
    }

    let room_recv = room.clone();
    let room_name = shopper_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error in document room '{}': {}", room_name, e);
                    break;
                }
            };

            match msg {
                Message::Binary(update) => {
                    if let Err(e) = room_recv.apply_and_forward(&peer_id, update.to_vec()).await {
                        tracing::warn!("Dropped document update in room '{}': {}", room_name, e);
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            if ws_sender.send(Message::Binary(update.into())).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let remaining = room.leave(&peer_id).await;
    tracing::info!(
        "Peer '{}' left document room '{}' ({} remaining)",
        peer_id,
        shopper_id,
        remaining
    );
    if remaining == 0 && state.collab_rooms.remove_if_empty(&shopper_id).await {
        tracing::info!("Document room '{}' torn down", shopper_id);
    }
}
