//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Chat assistant request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub conversation_id: Option<String>,
    pub current_filters: Option<serde_json::Value>,
    pub guided_mode: Option<bool>,
}

/// Chat assistant response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_filters: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guided_mode: Option<bool>,
}

/// One inventory car for the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDto {
    pub id: u32,
    pub make: String,
    pub model: String,
    pub year: u32,
    pub price: u32,
    pub mileage: u32,
    pub body_style: String,
    pub fuel_type: String,
    pub transmission: String,
    pub exterior_color: String,
    pub features: Vec<String>,
}
