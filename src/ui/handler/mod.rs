//! WebSocket and HTTP endpoint handlers.

pub mod call;
pub mod collaboration;
pub mod http;
pub mod monitor;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::repository::ConnectionSender;
use crate::infrastructure::dto::websocket::ErrorMessage;

/// Encode a frame and queue it on a connection's outbox.
/// Returns false when the connection is gone.
pub(crate) fn send_frame<T: Serialize>(sender: &ConnectionSender, frame: &T) -> bool {
    sender.send(serde_json::to_string(frame).unwrap()).is_ok()
}

/// Parse the payload of an inbound frame.
///
/// A payload that does not match the expected shape is answered with the
/// standard bad-frame error; the connection stays open.
pub(crate) fn parse_payload<T: DeserializeOwned>(
    sender: &ConnectionSender,
    text: &str,
) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::warn!("Failed to parse frame payload: {}", e);
            send_frame(sender, &ErrorMessage::new("Invalid message format"));
            None
        }
    }
}
