//! Representative WebSocket endpoint.
//!
//! Representatives register with a `connect` frame, receive a queue snapshot
//! on every change, and drive the claim/release/signaling/collaboration
//! operations. An ICE frame is only forwarded into a call the sender owns.

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
    domain::{RepId, repository::ConnectionSender},
    infrastructure::dto::websocket::{
        CallAnsweredMessage, CallClaimedMessage, CallReleasedAckMessage, CallReleasedMessage,
        ClaimCallPayload, CollaborationRequestMessage, CollaborationStatusMessage,
        ConnectedMessage, Envelope, ErrorMessage, IceCandidateToShopperMessage, MessageType,
        ReleaseCallPayload, RepConnectPayload, RepIceCandidatePayload,
        RequestCollaborationPayload,
    },
    ui::{
        broadcast::{broadcast_queue_update, queue_update_frame},
        state::AppState,
    },
    usecase::{ClaimCallUseCase, CollaborationUseCase, ReleaseCallUseCase, rep_display_name},
};

use super::{parse_payload, send_frame};

pub async fn monitor_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // Identity bound by the connect frame; read back on close
    let bound_id: Arc<StdMutex<Option<String>>> = Arc::new(StdMutex::new(None));

    let state_recv = state.clone();
    let tx_recv = tx.clone();
    let bound_recv = bound_id.clone();

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on monitor channel: {}", e);
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

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Connection close: unregister. Assignments held by this representative
    // deliberately stay in place; the shopper-initiated release path (or the
    // janitor, once the shopper is gone too) repairs them.
    let rep_id = bound_id.lock().unwrap().clone();
    if let Some(rep_id) = rep_id {
        state.repository.unregister_rep(&rep_id).await;
        tracing::info!("Representative '{}' disconnected", rep_id);
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
            tracing::warn!("Failed to parse frame on monitor channel: {}", e);
            send_frame(tx, &ErrorMessage::new("Invalid message format"));
            return;
        }
    };

    match envelope.r#type.as_str() {
        "connect" => {
            let Some(payload) = parse_payload::<RepConnectPayload>(tx, text) else {
                return;
            };
            let rep_id = match RepId::new(payload.sales_rep_id) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Rejected monitor connect: {}", e);
                    send_frame(tx, &ErrorMessage::new("Invalid message format"));
                    return;
                }
            };

            state.repository.register_rep(rep_id.clone(), tx.clone()).await;
            *bound_id.lock().unwrap() = Some(rep_id.as_str().to_string());

            // Current snapshot first, then the acknowledgment
            let snapshot = queue_update_frame(state).await;
            if tx.send(snapshot).is_err() {
                return;
            }
            send_frame(
                tx,
                &ConnectedMessage {
                    r#type: MessageType::Connected,
                    message: format!("Monitoring call queue as '{}'", rep_id),
                },
            );
            tracing::info!("Representative '{}' connected to the monitor", rep_id);
        }

        "claim_call" => {
            let Some(payload) = parse_payload::<ClaimCallPayload>(tx, text) else {
                return;
            };
            // A claim binds a shopper to this connection's identity, so the
            // representative must have registered first
            if bound_id.lock().unwrap().is_none() {
                send_frame(tx, &ErrorMessage::new("Not registered; send connect first"));
                return;
            }
            let rep_id = match RepId::new(payload.sales_rep_id.clone()) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!("Rejected claim_call: {}", e);
                    send_frame(tx, &ErrorMessage::new("Invalid message format"));
                    return;
                }
            };

            let usecase = ClaimCallUseCase::new(state.repository.clone());
            match usecase.execute(&payload.shopper_id, rep_id).await {
                Ok(entry) => {
                    send_frame(
                        tx,
                        &CallClaimedMessage {
                            r#type: MessageType::CallClaimed,
                            shopper_id: payload.shopper_id.clone(),
                            message: format!("Call with '{}' claimed", payload.shopper_id),
                        },
                    );

                    // Deliver the offer; a claim on a disconnected shopper
                    // still stands, the frame just has nowhere to go
                    let answered = CallAnsweredMessage {
                        r#type: MessageType::CallAnswered,
                        sales_rep_id: payload.sales_rep_id.clone(),
                        message: "A sales representative has answered your call".to_string(),
                        sdp_offer: payload.sdp_offer,
                    };
                    match state.repository.shopper_sender(entry.id.as_str()).await {
                        Some(sender) if send_frame(&sender, &answered) => {}
                        _ => tracing::warn!(
                            "Could not deliver call_answered to shopper '{}'",
                            entry.id
                        ),
                    }

                    tracing::info!(
                        "Representative '{}' claimed shopper '{}'",
                        payload.sales_rep_id,
                        payload.shopper_id
                    );
                    broadcast_queue_update(state).await;
                }
                Err(e) => {
                    tracing::warn!(
                        "Claim of '{}' by '{}' denied: {}",
                        payload.shopper_id,
                        payload.sales_rep_id,
                        e
                    );
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        "release_call" => {
            let Some(payload) = parse_payload::<ReleaseCallPayload>(tx, text) else {
                return;
            };
            let usecase = ReleaseCallUseCase::new(state.repository.clone());
            match usecase.execute(&payload.shopper_id).await {
                Ok(outcome) => {
                    send_frame(
                        tx,
                        &CallReleasedAckMessage {
                            r#type: MessageType::CallReleased,
                            shopper_id: payload.shopper_id.clone(),
                            message: format!("Call with '{}' released", payload.shopper_id),
                        },
                    );

                    let released = CallReleasedMessage {
                        r#type: MessageType::CallReleased,
                        previous_sales_rep_id: outcome
                            .previous_rep_id
                            .map(|rep| rep.into_string()),
                        position: outcome.position,
                        message: "You are back in the queue".to_string(),
                    };
                    match state.repository.shopper_sender(&payload.shopper_id).await {
                        Some(sender) if send_frame(&sender, &released) => {}
                        _ => tracing::debug!(
                            "Shopper '{}' not reachable for call_released",
                            payload.shopper_id
                        ),
                    }

                    tracing::info!(
                        "Representative '{}' released shopper '{}'",
                        payload.sales_rep_id,
                        payload.shopper_id
                    );
                    broadcast_queue_update(state).await;
                }
                Err(e) => {
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        "ice_candidate" => {
            let Some(payload) = parse_payload::<RepIceCandidatePayload>(tx, text) else {
                return;
            };

            // Authorization: a representative may only signal into calls it owns
            let Some(entry) = state.repository.get_shopper(&payload.shopper_id).await else {
                send_frame(
                    tx,
                    &ErrorMessage::new(format!(
                        "Shopper '{}' not found in queue",
                        payload.shopper_id
                    )),
                );
                return;
            };
            let owns_call = entry
                .assigned_rep_id
                .as_ref()
                .is_some_and(|rep| rep.as_str() == payload.sales_rep_id);
            if !owns_call {
                send_frame(
                    tx,
                    &ErrorMessage::new("Representative does not own this call"),
                );
                return;
            }

            let frame = IceCandidateToShopperMessage {
                r#type: MessageType::IceCandidate,
                sales_rep_id: payload.sales_rep_id.clone(),
                ice_candidate: payload.ice_candidate,
            };
            match state.repository.shopper_sender(&payload.shopper_id).await {
                Some(sender) if send_frame(&sender, &frame) => {}
                _ => {
                    tracing::warn!(
                        "Failed to forward ICE candidate to shopper '{}'",
                        payload.shopper_id
                    );
                    send_frame(tx, &ErrorMessage::new("Shopper is unavailable"));
                }
            }
        }

        "request_collaboration" => {
            let Some(payload) = parse_payload::<RequestCollaborationPayload>(tx, text) else {
                return;
            };
            let usecase = CollaborationUseCase::new(state.repository.clone());
            match usecase
                .request(&payload.shopper_id, &payload.sales_rep_id)
                .await
            {
                Ok(session) => {
                    let request = CollaborationRequestMessage {
                        r#type: MessageType::CollaborationRequest,
                        sales_rep_id: payload.sales_rep_id.clone(),
                        sales_rep_name: rep_display_name(&payload.sales_rep_id),
                    };
                    match state.repository.shopper_sender(&payload.shopper_id).await {
                        Some(sender) if send_frame(&sender, &request) => {}
                        _ => {
                            // The pending session stands; the shopper can
                            // still answer after reconnecting
                            tracing::warn!(
                                "Could not deliver collaboration_request to shopper '{}'",
                                payload.shopper_id
                            );
                            send_frame(tx, &ErrorMessage::new("Shopper is unavailable"));
                        }
                    }

                    send_frame(
                        tx,
                        &CollaborationStatusMessage {
                            r#type: MessageType::CollaborationStatus,
                            shopper_id: payload.shopper_id.clone(),
                            sales_rep_id: payload.sales_rep_id.clone(),
                            status: session.status,
                        },
                    );
                    tracing::info!(
                        "Representative '{}' requested collaboration with '{}'",
                        payload.sales_rep_id,
                        payload.shopper_id
                    );
                }
                Err(e) => {
                    send_frame(tx, &ErrorMessage::new(e.to_string()));
                }
            }
        }

        other => {
            tracing::warn!("Unknown message type '{}' on monitor channel", other);
        }
    }
}
