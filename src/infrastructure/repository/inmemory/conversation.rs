//! インメモリ会話スレッド置き場
//!
//! /api/chat の会話履歴をプロセス生存期間だけ保持します。最初のリクエストで
//! スレッド ID（UUID v4）を発行し、以降のリクエストは同じ ID で履歴を引き継ぐ。

use std::collections::HashMap;

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::infrastructure::llm::ChatTurn;

/// インメモリ会話ストア
pub struct InMemoryConversationStore {
    threads: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl InMemoryConversationStore {
    /// 新しい InMemoryConversationStore を作成
    pub fn new() -> Self {
        Self {
            threads: Mutex::new(HashMap::new()),
        }
    }

    /// 既存スレッドの履歴を取得するか、新しいスレッドを発行する。
    ///
    /// 未知の ID が渡された場合も新しいスレッドとして扱う（プロセス再起動で
    /// 状態は失われるため、クライアントは古い ID を送ってくることがある）。
    pub async fn get_or_create(&self, conversation_id: Option<String>) -> (String, Vec<ChatTurn>) {
        let mut threads = self.threads.lock().await;
        if let Some(id) = conversation_id
            && let Some(history) = threads.get(&id)
        {
            return (id, history.clone());
        }

        let id = Uuid::new_v4().to_string();
        threads.insert(id.clone(), Vec::new());
        (id, Vec::new())
    }

    /// 1往復分（ユーザー発話とアシスタント応答）を履歴に追記する
    pub async fn append(&self, conversation_id: &str, user: ChatTurn, assistant: ChatTurn) {
        let mut threads = self.threads.lock().await;
        let history = threads.entry(conversation_id.to_string()).or_default();
        history.push(user);
        history.push(assistant);
    }
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
