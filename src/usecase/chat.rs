//! UseCase: チャットアシスタント処理
//!
//! ステートレスな POST /api/chat の裏側。会話はスレッド ID に固定され、
//! 履歴はプロセス生存期間だけ保持される。アシスタント本体（フィルタ編集の
//! 判断を含む）は外部の LLM プロバイダであり、ここではプロンプトの組み立てと
//! 応答の解釈だけを行う。

use std::sync::Arc;

use crate::infrastructure::{
    dto::http::{ChatRequest, ChatResponse},
    llm::{AnthropicClient, ChatTurn},
    repository::InMemoryConversationStore,
};

use super::error::ChatError;

/// チャットアシスタントのユースケース
pub struct ChatUseCase {
    /// プロバイダクライアント（API キー未設定なら None）
    client: Option<Arc<AnthropicClient>>,
    /// 会話スレッドの置き場
    conversations: Arc<InMemoryConversationStore>,
}

impl ChatUseCase {
    /// API キーからユースケースを組み立てる。キーが無ければアシスタントは
    /// 無効のまま起動し、リクエストは NotConfigured になる。
    pub fn new(api_key: Option<String>) -> Self {
        let client = match api_key {
            Some(key) if !key.is_empty() => match AnthropicClient::new(key) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!("Chat assistant disabled: {}", e);
                    None
                }
            },
            _ => {
                tracing::info!("No LLM API key configured; chat assistant disabled");
                None
            }
        };

        Self {
            client,
            conversations: Arc::new(InMemoryConversationStore::new()),
        }
    }

    /// 1 リクエスト分のチャット往復を実行
    pub async fn execute(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let client = self.client.as_ref().ok_or(ChatError::NotConfigured)?;

        let (conversation_id, history) = self
            .conversations
            .get_or_create(request.conversation_id.clone())
            .await;

        let system = build_system_prompt(
            request.current_filters.as_ref(),
            request.guided_mode.unwrap_or(false),
        );

        let mut messages = history;
        messages.push(ChatTurn::user(request.message.clone()));

        let raw = client.complete(&system, &messages).await?;
        let (response, updated_filters) = parse_assistant_reply(&raw);

        self.conversations
            .append(
                &conversation_id,
                ChatTurn::user(request.message),
                ChatTurn::assistant(raw),
            )
            .await;

        Ok(ChatResponse {
            response,
            conversation_id,
            updated_filters,
            guided_mode: request.guided_mode,
        })
    }
}

/// アシスタントへのシステムプロンプトを組み立てる
fn build_system_prompt(current_filters: Option<&serde_json::Value>, guided_mode: bool) -> String {
    let filters = current_filters
        .map(|f| f.to_string())
        .unwrap_or_else(|| "{}".to_string());

    let guidance = if guided_mode {
        "Guided mode is ON: proactively suggest one next filter refinement per reply."
    } else {
        "Guided mode is OFF: only change filters the shopper explicitly asks for."
    };

    format!(
        "You are a car shopping assistant for a dealership. Help the shopper \
         narrow down the inventory. The shopper's current search filters are: \
         {filters}. {guidance} Reply with a single JSON object of the shape \
         {{\"response\": \"<your message to the shopper>\", \
         \"updatedFilters\": <the full new filter object, or null if \
         unchanged>}} and nothing else."
    )
}

/// アシスタント応答を解釈する。
///
/// 指示どおりの JSON なら response と updatedFilters を取り出す。そうでない
/// 応答はそのまま本文として扱い、フィルタは更新しない。
fn parse_assistant_reply(raw: &str) -> (String, Option<serde_json::Value>) {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(raw.trim())
        && let Some(response) = map.get("response").and_then(|v| v.as_str())
    {
        let updated_filters = map
            .get("updatedFilters")
            .filter(|v| !v.is_null())
            .cloned();
        return (response.to_string(), updated_filters);
    }
    (raw.trim().to_string(), None)
}
