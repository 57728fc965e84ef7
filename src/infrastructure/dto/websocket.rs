//! WebSocket frame DTOs for the shopper and representative channels.
//!
//! Every frame is a JSON object with a snake_case `type` discriminator and
//! camelCase payload fields. Inbound frames are parsed in two stages: the
//! `Envelope` yields the type tag, then the matching payload struct is
//! deserialized — so a malformed payload and an unknown type stay
//! distinguishable at the endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::{CollabStatus, ShopperEntry};

/// Message type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Connected,
    QueueJoined,
    QueueLeft,
    QueueUpdate,
    CallAnswered,
    CallClaimed,
    CallReleased,
    CallEnded,
    CallEndedByShopper,
    SdpAnswer,
    IceCandidate,
    CollaborationRequest,
    CollaborationStatus,
    Error,
}

/// First parse stage for inbound frames: the type tag only
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub r#type: String,
}

// ---------------------------------------------------------------------------
// Inbound payloads — shopper channel
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinQueuePayload {
    pub shopper_id: String,
    pub media_capabilities: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveQueuePayload {
    pub shopper_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdpAnswerPayload {
    pub shopper_id: String,
    pub sdp_answer: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperIceCandidatePayload {
    pub shopper_id: String,
    pub ice_candidate: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndCallPayload {
    pub shopper_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationResponsePayload {
    pub shopper_id: String,
    pub sales_rep_id: String,
    pub accepted: bool,
}

// ---------------------------------------------------------------------------
// Inbound payloads — representative channel
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepConnectPayload {
    pub sales_rep_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimCallPayload {
    pub sales_rep_id: String,
    pub shopper_id: String,
    pub sdp_offer: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseCallPayload {
    pub sales_rep_id: String,
    pub shopper_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepIceCandidatePayload {
    pub sales_rep_id: String,
    pub shopper_id: String,
    pub ice_candidate: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCollaborationPayload {
    pub sales_rep_id: String,
    pub shopper_id: String,
}

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// Liveness acknowledgment, sent when a duplex channel opens or a
/// representative registers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub r#type: MessageType,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueJoinedMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub position: usize,
    pub has_microphone: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueLeftMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnsweredMessage {
    pub r#type: MessageType,
    pub sales_rep_id: String,
    pub message: String,
    pub sdp_offer: serde_json::Value,
}

/// Acknowledgment to the representative that a claim succeeded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallClaimedMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub message: String,
}

/// Release notification to the shopper, carrying its new position
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReleasedMessage {
    pub r#type: MessageType,
    pub previous_sales_rep_id: Option<String>,
    pub position: usize,
    pub message: String,
}

/// Acknowledgment to the representative that a release went through
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReleasedAckMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEndedMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEndedByShopperMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
}

/// SDP answer forwarded from the shopper to its representative
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SdpAnswerMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub sdp_answer: serde_json::Value,
}

/// ICE candidate forwarded to the representative
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateToRepMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub ice_candidate: serde_json::Value,
}

/// ICE candidate forwarded to the shopper
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateToShopperMessage {
    pub r#type: MessageType,
    pub sales_rep_id: String,
    pub ice_candidate: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationRequestMessage {
    pub r#type: MessageType,
    pub sales_rep_id: String,
    pub sales_rep_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationStatusMessage {
    pub r#type: MessageType,
    pub shopper_id: String,
    pub sales_rep_id: String,
    pub status: CollabStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueUpdateMessage {
    pub r#type: MessageType,
    pub queue: Vec<QueueSummaryDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub r#type: MessageType,
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            r#type: MessageType::Error,
            message: message.into(),
        }
    }
}

/// Public projection of one shopper entry, connection handles stripped
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSummaryDto {
    pub shopper_id: String,
    /// Unix timestamp (milliseconds since epoch)
    pub connected_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnected_at: Option<i64>,
    pub is_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_since_disconnected_seconds: Option<i64>,
    pub assigned_rep_id: Option<String>,
    pub has_microphone: bool,
}

impl QueueSummaryDto {
    /// Project a shopper entry, filling the disconnect age from `now_ms`
    pub fn from_entry(entry: &ShopperEntry, now_ms: i64) -> Self {
        Self {
            shopper_id: entry.id.as_str().to_string(),
            connected_at: entry.connected_at.value(),
            disconnected_at: entry.disconnected_at.map(|t| t.value()),
            is_connected: entry.is_connected,
            time_since_disconnected_seconds: entry
                .disconnected_at
                .map(|t| (now_ms - t.value()) / 1000),
            assigned_rep_id: entry.assigned_rep_id.as_ref().map(|r| r.as_str().to_string()),
            has_microphone: entry.has_microphone,
        }
    }
}
