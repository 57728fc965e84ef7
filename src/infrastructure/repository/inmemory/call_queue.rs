//! InMemory CallQueue Repository 実装
//!
//! ドメイン層が定義する CallQueueRepository trait の具体的な実装。
//! CallQueue 集約と接続ハンドルのテーブルを単一の Mutex で保護し、
//! trait の各操作をアトミックにします。競合する claim はこの Mutex で
//! 直列化され、必ず一方だけが成功します。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    common::time::current_timestamp,
    domain::{
        CallQueue, CallQueueRepository, ClaimError, CollabError, CollaborationSession, RepId,
        ShopperEntry, ShopperId, Timestamp,
        repository::ConnectionSender,
    },
    ui::state::ClientInfo,
};

/// 単一 Mutex の内側で保持する全テーブル
#[derive(Default)]
struct StoreInner {
    /// CallQueue ドメインモデル（エントリと collaboration セッション）
    queue: CallQueue,
    /// 接続中 shopper の送信ハンドル
    shopper_clients: HashMap<String, ClientInfo>,
    /// 接続中 representative の送信ハンドル
    rep_clients: HashMap<String, ClientInfo>,
}

/// インメモリ CallQueue Repository 実装
pub struct InMemoryCallQueueRepository {
    inner: Mutex<StoreInner>,
}

impl InMemoryCallQueueRepository {
    /// 新しい InMemoryCallQueueRepository を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }
}

impl Default for InMemoryCallQueueRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallQueueRepository for InMemoryCallQueueRepository {
    async fn upsert_shopper(
        &self,
        shopper_id: ShopperId,
        sender: ConnectionSender,
        has_microphone: bool,
        media_capabilities: Option<serde_json::Value>,
    ) -> ShopperEntry {
        let now = current_timestamp();
        let mut inner = self.inner.lock().await;
        let entry = inner.queue.upsert_shopper(
            shopper_id.clone(),
            has_microphone,
            media_capabilities,
            Timestamp::new(now),
        );
        inner.shopper_clients.insert(
            shopper_id.into_string(),
            ClientInfo {
                sender,
                connected_at: now,
            },
        );
        entry
    }

    async fn mark_shopper_disconnected(&self, shopper_id: &str) -> Option<ShopperEntry> {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        inner.shopper_clients.remove(shopper_id);
        inner.queue.mark_disconnected(shopper_id, now)
    }

    async fn remove_shopper(&self, shopper_id: &str) -> bool {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        let removed = inner.queue.remove_shopper(shopper_id);
        if removed {
            inner.queue.end_collab_for_shopper(shopper_id, now);
            inner.shopper_clients.remove(shopper_id);
        }
        removed
    }

    async fn get_shopper(&self, shopper_id: &str) -> Option<ShopperEntry> {
        let inner = self.inner.lock().await;
        inner.queue.get_shopper(shopper_id).cloned()
    }

    async fn register_rep(&self, rep_id: RepId, sender: ConnectionSender) {
        let now = current_timestamp();
        let mut inner = self.inner.lock().await;
        inner.rep_clients.insert(
            rep_id.into_string(),
            ClientInfo {
                sender,
                connected_at: now,
            },
        );
    }

    async fn unregister_rep(&self, rep_id: &str) {
        let mut inner = self.inner.lock().await;
        inner.rep_clients.remove(rep_id);
    }

    async fn rep_busy_with(&self, rep_id: &str) -> Option<String> {
        let inner = self.inner.lock().await;
        inner
            .queue
            .rep_busy_with(rep_id)
            .map(|e| e.id.as_str().to_string())
    }

    async fn assign(&self, shopper_id: &str, rep_id: RepId) -> Result<ShopperEntry, ClaimError> {
        let mut inner = self.inner.lock().await;
        inner.queue.assign(shopper_id, rep_id)
    }

    async fn release(&self, shopper_id: &str) -> Option<(ShopperEntry, Option<RepId>)> {
        let mut inner = self.inner.lock().await;
        inner.queue.release(shopper_id)
    }

    async fn snapshot(&self) -> Vec<ShopperEntry> {
        let inner = self.inner.lock().await;
        inner.queue.entries_by_arrival()
    }

    async fn position_of(&self, shopper_id: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.queue.position_of(shopper_id)
    }

    async fn request_collab(
        &self,
        shopper_id: &str,
        rep_id: &str,
    ) -> Result<CollaborationSession, CollabError> {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        inner.queue.request_collab(shopper_id, rep_id, now)
    }

    async fn respond_collab(
        &self,
        shopper_id: &str,
        rep_id: &str,
        accepted: bool,
    ) -> Result<CollaborationSession, CollabError> {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        inner.queue.respond_collab(shopper_id, rep_id, accepted, now)
    }

    async fn end_collab_for_shopper(&self, shopper_id: &str) -> Option<CollaborationSession> {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        inner.queue.end_collab_for_shopper(shopper_id, now)
    }

    async fn get_collab(&self, shopper_id: &str, rep_id: &str) -> Option<CollaborationSession> {
        let inner = self.inner.lock().await;
        inner.queue.get_collab(shopper_id, rep_id).cloned()
    }

    async fn evict_stale_shoppers(&self, grace_ms: i64) -> Vec<ShopperEntry> {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        let evicted = inner.queue.evict_stale_shoppers(grace_ms, now);
        for entry in &evicted {
            inner.shopper_clients.remove(entry.id.as_str());
        }
        evicted
    }

    async fn evict_expired_collab_requests(&self, ttl_ms: i64) -> usize {
        let now = Timestamp::new(current_timestamp());
        let mut inner = self.inner.lock().await;
        inner.queue.evict_expired_collab_requests(ttl_ms, now)
    }

    async fn shopper_sender(&self, shopper_id: &str) -> Option<ConnectionSender> {
        let inner = self.inner.lock().await;
        inner
            .shopper_clients
            .get(shopper_id)
            .map(|info| info.sender.clone())
    }

    async fn rep_sender(&self, rep_id: &str) -> Option<ConnectionSender> {
        let inner = self.inner.lock().await;
        inner.rep_clients.get(rep_id).map(|info| info.sender.clone())
    }

    async fn rep_senders(&self) -> Vec<(String, ConnectionSender)> {
        let inner = self.inner.lock().await;
        inner
            .rep_clients
            .iter()
            .map(|(id, info)| (id.clone(), info.sender.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryCallQueueRepository の基本的な CRUD 操作
    // - shopper の upsert / 切断 / 削除が queue と sender テーブルの
    //   両方に反映されること
    // - 競合する claim が直列化され、一方だけが成功すること
    //
    // 【なぜこのテストが必要か】
    // - Repository は UseCase から呼ばれるデータアクセス層の中核
    // - queue と sender テーブルの整合性を保証する必要がある
    // - 仕様の排他制御（同一 shopper への二重 claim 禁止）の土台
    // ========================================

    fn shopper(id: &str) -> ShopperId {
        ShopperId::new(id.to_string()).unwrap()
    }

    fn rep(id: &str) -> RepId {
        RepId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_upsert_shopper_registers_sender() {
        // テスト項目: upsert で queue と sender テーブルの両方に登録される
        // given (前提条件):
        let repo = InMemoryCallQueueRepository::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let entry = repo.upsert_shopper(shopper("s1"), tx, true, None).await;

        // then (期待する結果):
        assert!(entry.is_connected);
        assert!(repo.shopper_sender("s1").await.is_some());
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_disconnected_drops_sender() {
        // テスト項目: 切断マークで sender が破棄され、エントリは残る
        // given (前提条件):
        let repo = InMemoryCallQueueRepository::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        repo.upsert_shopper(shopper("s1"), tx, true, None).await;

        // when (操作):
        let entry = repo.mark_shopper_disconnected("s1").await.unwrap();

        // then (期待する結果):
        assert!(!entry.is_connected);
        assert!(repo.shopper_sender("s1").await.is_none());
        assert_eq!(repo.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_shopper_ends_sessions() {
        // テスト項目: 削除時に関連する collaboration セッションが ended になる
        // given (前提条件):
        let repo = InMemoryCallQueueRepository::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        repo.upsert_shopper(shopper("s1"), tx, true, None).await;
        repo.assign("s1", rep("r1")).await.unwrap();
        repo.request_collab("s1", "r1").await.unwrap();

        // when (操作):
        let removed = repo.remove_shopper("s1").await;

        // then (期待する結果):
        assert!(removed);
        assert!(repo.get_shopper("s1").await.is_none());
        // 2回目の削除は false（冪等性）
        assert!(!repo.remove_shopper("s1").await);
    }

    #[tokio::test]
    async fn test_concurrent_claims_exactly_one_succeeds() {
        // テスト項目: 同じ shopper への並行 claim はちょうど1つだけ成功する
        // given (前提条件):
        let repo = Arc::new(InMemoryCallQueueRepository::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        repo.upsert_shopper(shopper("s1"), tx, true, None).await;

        // when (操作): 2人の rep が同時に claim する
        let repo1 = repo.clone();
        let repo2 = repo.clone();
        let claim1 = tokio::spawn(async move { repo1.assign("s1", rep("r1")).await });
        let claim2 = tokio::spawn(async move { repo2.assign("s1", rep("r2")).await });
        let result1 = claim1.await.unwrap();
        let result2 = claim2.await.unwrap();

        // then (期待する結果):
        assert_eq!(
            result1.is_ok() as u8 + result2.is_ok() as u8,
            1,
            "exactly one claim must succeed"
        );
        let assigned = repo.get_shopper("s1").await.unwrap().assigned_rep_id;
        assert!(assigned == Some(rep("r1")) || assigned == Some(rep("r2")));
    }

    #[tokio::test]
    async fn test_rep_registration_roundtrip() {
        // テスト項目: rep の登録・解除が sender テーブルに反映される
        // given (前提条件):
        let repo = InMemoryCallQueueRepository::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        repo.register_rep(rep("r1"), tx).await;

        // then (期待する結果):
        assert!(repo.rep_sender("r1").await.is_some());
        assert_eq!(repo.rep_senders().await.len(), 1);

        repo.unregister_rep("r1").await;
        assert!(repo.rep_sender("r1").await.is_none());
    }

    #[tokio::test]
    async fn test_evict_stale_shoppers_clears_sender_table() {
        // テスト項目: janitor sweep が queue と sender テーブルを同期させる
        // given (前提条件):
        let repo = InMemoryCallQueueRepository::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        repo.upsert_shopper(shopper("s1"), tx, true, None).await;
        repo.mark_shopper_disconnected("s1").await;

        // when (操作): 猶予 0ms で sweep（経過時間 > 0 は即 evict）
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let evicted = repo.evict_stale_shoppers(0).await;

        // then (期待する結果):
        assert_eq!(evicted.len(), 1);
        assert!(repo.get_shopper("s1").await.is_none());
    }
}
