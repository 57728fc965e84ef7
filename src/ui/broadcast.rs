//! Queue snapshot fan-out to representative connections.

use crate::{
    common::time::current_timestamp,
    infrastructure::dto::websocket::{MessageType, QueueSummaryDto, QueueUpdateMessage},
};

use super::state::AppState;

/// Build and encode the queue_update frame for the current store state.
///
/// The snapshot is taken and encoded once, so every recipient of one
/// broadcast observes the same post-change state.
pub async fn queue_update_frame(state: &AppState) -> String {
    let entries = state.repository.snapshot().await;
    let now = current_timestamp();
    let queue: Vec<QueueSummaryDto> = entries
        .iter()
        .map(|entry| QueueSummaryDto::from_entry(entry, now))
        .collect();

    let msg = QueueUpdateMessage {
        r#type: MessageType::QueueUpdate,
        queue,
    };
    serde_json::to_string(&msg).unwrap()
}

/// Push the current queue snapshot to every representative connection.
///
/// Each send is best-effort: a failed write is logged, and the connection is
/// left for its own close handler to unregister.
pub async fn broadcast_queue_update(state: &AppState) {
    let encoded = queue_update_frame(state).await;
    for (rep_id, sender) in state.repository.rep_senders().await {
        if sender.send(encoded.clone()).is_err() {
            tracing::warn!("Failed to push queue_update to representative '{}'", rep_id);
        }
    }
}
