//! Request/response types for the Anthropic Messages API.

use serde::{Deserialize, Serialize};

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation, as sent to the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request body for the Messages API
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<ChatTurn>,
}

/// Response body from the Messages API (non-streaming)
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub content: Vec<ContentBlock>,
}

impl MessageResponse {
    /// Concatenated text of all text content blocks
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One content block of a response
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

/// Error payload returned by the API on non-2xx status
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_text_concatenates_blocks() {
        // テスト項目: text() は text ブロックだけを連結する
        // given (前提条件):
        let response: MessageResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello"},
                {"type": "tool_use", "text": null},
                {"type": "text", "text": " world"}
            ]
        }))
        .unwrap();

        // then (期待する結果):
        assert_eq!(response.text(), "Hello world");
    }

    #[test]
    fn test_chat_turn_serializes_lowercase_role() {
        // テスト項目: role は小文字でシリアライズされる
        // given (前提条件):
        let turn = ChatTurn::user("hi");

        // when (操作):
        let json = serde_json::to_value(&turn).unwrap();

        // then (期待する結果):
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }
}
