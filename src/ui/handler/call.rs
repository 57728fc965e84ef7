//! Shopper WebSocket endpoint.
//!
//! One duplex channel per shopper. The identity is bound by the first
//! `join_queue` frame; connection close marks the shopper disconnected and
//! leaves the entry for the janitor's grace window.

use std::sync::{Arc, Mutex as StdMutex};

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
    domain::{ShopperId, repository::ConnectionSender},
    infrastructure::dto::websocket::{
        CallEndedByShopperMessage, CallEndedMessage, CollaborationResponsePayload,
        CollaborationStatusMessage, ConnectedMessage, EndCallPayload, Envelope, ErrorMessage,
        IceCandidateToRepMessage, JoinQueuePayload, LeaveQueuePayload, MessageType,
        QueueJoinedMessage, QueueLeftMessage, SdpAnswerMessage, SdpAnswerPayload,
        ShopperIceCandidatePayload,
    },
    ui::{broadcast::broadcast_queue_update, state::AppState},
    usecase::{
        CollaborationUseCase, DisconnectShopperUseCase, JoinQueueUseCase, LeaveQueueUseCase,
        ReleaseCallUseCase,
    },
};

use super::{parse_payload, send_frame};

pub async fn call_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Liveness acknowledgment, immediately after the channel opens
    send_frame(
        &tx,
        &ConnectedMessage {
            r#type: MessageType::Connected,
            message: "Connected to call service".to_string(),
        },
    );

    // Identity bound by the first join_queue frame; read back on close
    let bound_id: Arc<StdMutex<Option<String>>> = Arc::new(StdMutex::new(None));

    let state_recv = state.clone();
    let tx_recv = tx.clone();
    let bound_recv = bound_id.clone();

    // Receive frames from this shopper; one frame in flight per connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on call channel: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_frame(&state_recv, &tx_recv, &bound_recv, &text).await;
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Drain the outbox into the socket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Connection close: mark disconnected, keep the entry for the janitor
    let shopper_id = bound_id.lock().unwrap().clone();
    if let Some(shopper_id) = shopper_id {
        let usecase = DisconnectShopperUseCase::new(state.repository.clone());
        if usecase.execute(&shopper_id).await.is_some() {
            tracing::info!(
                "Shopper '{}' disconnected; entry retained for the grace window",
                shopper_id
            );
            broadcast_queue_update(&state).await;
        }
    }
}

async fn handle_frame(
    state: &Arc<AppState>,
    tx: &ConnectionSender,
    bound_id: &Arc<StdMutex<Option<String>>>,
    text: &str,
) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!("Failed to parse frame on call channel: {}", e);
            send_frame(tx, &ErrorMessage::new("Invalid message format"));
            return;
        }
    };

    match envelope.r#type.as_str() {
        "join_queue" => {
            let Some(payload) = parse_payload::<JoinQueuePayload>(tx, text) else {
                return;
            };
            let shopper_id = match ShopperId::new(payload.shopper_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Rejected join_queue: {}", e);
                    send_frame(tx, &ErrorMessage::new("Invalid message format"));
                    return;
                }
            };

            let usecase = JoinQueueUseCase::new(state.repository.clone());
            let outcome = usecase
                .execute(shopper_id, tx.clone(), payload.media_capabilities)
                .await;

            *bound_id.lock().unwrap() = Some(outcome.entry.id.as_str().to_string());

            send_frame(
                tx,
                &QueueJoinedMessage {
                    r#type: MessageType::QueueJoined,
                    shopper_id: outcome.entry.id.as_str().to_string(),
                    position: outcome.position,
                    has_microphone: outcome.entry.has_microphone,
                },
            );
            tracing::info!(
                "Shopper '{}' joined the queue at position {}",
                outcome.entry.id,
                outcome.position
            );
            broadcast_queue_update(state).await;
        }

        "leave_queue" => {
            let Some(payload) = parse_payload::<LeaveQueuePayload>(tx, text) else {
                return;
            };
            let usecase = LeaveQueueUseCase::new(state.repository.clone());
            match usecase.execute(&payload.shopper_id).await {
                Ok(()) => {
                    send_frame(
                        tx,
                        &QueueLeftMessage {
                            r#type: MessageType::QueueLeft,
                            shopper_id: payload.shopper_id.clone(),
                        },
                    );
                    tracing::info!("Shopper '{}' left the queue", payload.shopper_id);
                    broadcast_queue_update(state).await;
                }
                Err(e) => {
                    // Second leave is a no-op: no state change, no broadcast
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        "sdp_answer" => {
            let Some(payload) = parse_payload::<SdpAnswerPayload>(tx, text) else {
                return;
            };
            let frame = SdpAnswerMessage {
                r#type: MessageType::SdpAnswer,
                shopper_id: payload.shopper_id.clone(),
                sdp_answer: payload.sdp_answer,
            };
            forward_to_assigned_rep(
                state,
                tx,
                &payload.shopper_id,
                serde_json::to_string(&frame).unwrap(),
            )
            .await;
        }

        "ice_candidate" => {
            let Some(payload) = parse_payload::<ShopperIceCandidatePayload>(tx, text) else {
                return;
            };
            let frame = IceCandidateToRepMessage {
                r#type: MessageType::IceCandidate,
                shopper_id: payload.shopper_id.clone(),
                ice_candidate: payload.ice_candidate,
            };
            forward_to_assigned_rep(
                state,
                tx,
                &payload.shopper_id,
                serde_json::to_string(&frame).unwrap(),
            )
            .await;
        }

        "end_call" => {
            let Some(payload) = parse_payload::<EndCallPayload>(tx, text) else {
                return;
            };
            let usecase = ReleaseCallUseCase::new(state.repository.clone());
            match usecase.execute(&payload.shopper_id).await {
                Ok(outcome) => {
                    // Tell the former representative the shopper hung up
                    if let Some(rep_id) = &outcome.previous_rep_id {
                        let ended = CallEndedByShopperMessage {
                            r#type: MessageType::CallEndedByShopper,
                            shopper_id: payload.shopper_id.clone(),
                        };
                        match state.repository.rep_sender(rep_id.as_str()).await {
                            Some(sender) if send_frame(&sender, &ended) => {}
                            _ => tracing::warn!(
                                "Could not notify representative '{}' of ended call",
                                rep_id
                            ),
                        }
                    }

                    send_frame(
                        tx,
                        &CallEndedMessage {
                            r#type: MessageType::CallEnded,
                            shopper_id: payload.shopper_id.clone(),
                        },
                    );
                    tracing::info!("Shopper '{}' ended the call", payload.shopper_id);
                    broadcast_queue_update(state).await;
                }
                Err(e) => {
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        "collaboration_response" => {
            let Some(payload) = parse_payload::<CollaborationResponsePayload>(tx, text) else {
                return;
            };
            let usecase = CollaborationUseCase::new(state.repository.clone());
            match usecase
                .respond(&payload.shopper_id, &payload.sales_rep_id, payload.accepted)
                .await
            {
                Ok(session) => {
                    let status = CollaborationStatusMessage {
                        r#type: MessageType::CollaborationStatus,
                        shopper_id: payload.shopper_id.clone(),
                        sales_rep_id: payload.sales_rep_id.clone(),
                        status: session.status,
                    };
                    send_frame(tx, &status);
                    match state.repository.rep_sender(&payload.sales_rep_id).await {
                        Some(sender) if send_frame(&sender, &status) => {}
                        _ => tracing::warn!(
                            "Could not deliver collaboration_status to representative '{}'",
                            payload.sales_rep_id
                        ),
                    }
                    tracing::info!(
                        "Shopper '{}' {} collaboration with '{}'",
                        payload.shopper_id,
                        if payload.accepted { "accepted" } else { "rejected" },
                        payload.sales_rep_id
                    );
                }
                Err(e) => {
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        other => {
            tracing::warn!("Unknown message type '{}' on call channel", other);
        }
    }
}

/// Forward a pre-encoded signaling frame to the representative assigned to
/// the shopper. Only the assigned representative may receive signaling; an
/// unassigned shopper gets an error reply instead.
async fn forward_to_assigned_rep(
    state: &Arc<AppState>,
    tx: &ConnectionSender,
    shopper_id: &str,
    encoded: String,
) {
    let Some(entry) = state.repository.get_shopper(shopper_id).await else {
        send_frame(
            tx,
            &ErrorMessage::new(format!("Shopper '{shopper_id}' not found in queue")),
        );
        return;
    };

    let Some(rep_id) = entry.assigned_rep_id else {
        send_frame(tx, &ErrorMessage::new("No active call for this shopper"));
        return;
    };

    match state.repository.rep_sender(rep_id.as_str()).await {
        Some(sender) if sender.send(encoded).is_ok() => {}
        _ => {
            tracing::warn!(
                "Failed to forward signaling from shopper '{}' to representative '{}'",
                shopper_id,
                rep_id
            );
            send_frame(tx, &ErrorMessage::new("Representative is unavailable"));
        }
    }
}
