//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    infrastructure::{
        dto::http::{CarDto, ChatRequest, ChatResponse},
        inventory,
    },
    ui::state::AppState,
    usecase::ChatError,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Static car inventory listing
pub async fn get_cars() -> Json<Vec<CarDto>> {
    Json(inventory::all_cars())
}

/// Chat assistant endpoint.
///
/// 503 when no provider key is configured, 502 when the provider call fails.
pub async fn post_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    match state.chat.execute(request).await {
        Ok(response) => Ok(Json(response)),
        Err(ChatError::NotConfigured) => Err(StatusCode::SERVICE_UNAVAILABLE),
        Err(ChatError::Provider(e)) => {
            tracing::warn!("Chat assistant request failed: {}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}
