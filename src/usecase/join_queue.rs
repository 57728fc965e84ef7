//! UseCase: キュー参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinQueueUseCase::execute() メソッド
//! - 参加処理（エントリの upsert、待ち順位の算出、マイク有無の導出）
//!
//! ### なぜこのテストが必要か
//! - 再接続しても connected_at（到着順）が維持されることを保証
//! - mediaCapabilities から hasMicrophone が正しく導出されることを確認
//! - 返される待ち順位が queue_joined フレームの内容そのものになる
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加、複数人参加時の FIFO 順位
//! - エッジケース：切断からの再参加（到着順維持、assignment 維持）

use std::sync::Arc;

use crate::domain::{CallQueueRepository, ShopperEntry, ShopperId, repository::ConnectionSender};

/// 参加処理の結果
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// 登録後のエントリ
    pub entry: ShopperEntry,
    /// 待ち行列での 1 始まりの順位（待ち行列外なら 0）
    pub position: usize,
}

/// キュー参加のユースケース
pub struct JoinQueueUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl JoinQueueUseCase {
    /// 新しい JoinQueueUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// キュー参加を実行
    ///
    /// # Arguments
    ///
    /// * `shopper_id` - 参加する shopper の ID（Domain Model）
    /// * `sender` - この接続の送信チャンネル
    /// * `media_capabilities` - クライアントが申告したメディア能力（不透明）
    ///
    /// # Returns
    ///
    /// 登録後のエントリと現在の待ち順位
    pub async fn execute(
        &self,
        shopper_id: ShopperId,
        sender: ConnectionSender,
        media_capabilities: Option<serde_json::Value>,
    ) -> JoinOutcome {
        // hasMicrophone は capability レコードの hasAudioInput から導出する
        let has_microphone = media_capabilities
            .as_ref()
            .and_then(|caps| caps.get("hasAudioInput"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let entry = self
            .repository
            .upsert_shopper(shopper_id, sender, has_microphone, media_capabilities)
            .await;
        let position = self.repository.position_of(entry.id.as_str()).await;

        JoinOutcome { entry, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::InMemoryCallQueueRepository;
    use tokio::sync::mpsc;

    fn create_test_repository() -> Arc<InMemoryCallQueueRepository> {
        Arc::new(InMemoryCallQueueRepository::new())
    }

    fn shopper(id: &str) -> ShopperId {
        ShopperId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_queue_first_shopper_is_position_one() {
        // テスト項目: 最初の参加者は順位 1 になる
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = JoinQueueUseCase::new(repository.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let caps = serde_json::json!({"hasAudioInput": true, "hasVideoInput": false});
        let outcome = usecase.execute(shopper("s1"), tx, Some(caps)).await;

        // then (期待する結果):
        assert_eq!(outcome.position, 1);
        assert!(outcome.entry.has_microphone);
        assert!(outcome.entry.is_connected);
    }

    #[tokio::test]
    async fn test_join_queue_fifo_positions() {
        // テスト項目: 参加順で順位が振られる
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = JoinQueueUseCase::new(repository.clone());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(shopper("s1"), tx1, None).await;
        let second = usecase.execute(shopper("s2"), tx2, None).await;

        // then (期待する結果):
        assert_eq!(first.position, 1);
        assert_eq!(second.position, 2);
    }

    #[tokio::test]
    async fn test_join_queue_without_audio_input() {
        // テスト項目: hasAudioInput が無ければ hasMicrophone は false
        // given (前提条件):
        let repository = create_test_repository();
        let usecase = JoinQueueUseCase::new(repository.clone());
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let outcome = usecase
            .execute(shopper("s1"), tx, Some(serde_json::json!({"hasVideoInput": true})))
            .await;

        // then (期待する結果):
        assert!(!outcome.entry.has_microphone);
    }

    #[tokio::test]
    async fn test_rejoin_preserves_arrival_order() {
        // テスト項目: 切断から再参加しても到着順（connected_at）が維持される
        // given (前提条件): s1, s2 の順で参加し、s1 が切断
        let repository = create_test_repository();
        let usecase = JoinQueueUseCase::new(repository.clone());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let original = usecase.execute(shopper("s1"), tx1, None).await;
        usecase.execute(shopper("s2"), tx2, None).await;
        repository.mark_shopper_disconnected("s1").await;

        // when (操作): s1 が再参加する
        let (tx3, _rx3) = mpsc::unbounded_channel();
        let rejoined = usecase.execute(shopper("s1"), tx3, None).await;

        // then (期待する結果): 先頭の順位と元の connected_at が戻る
        assert_eq!(rejoined.position, 1);
        assert_eq!(rejoined.entry.connected_at, original.entry.connected_at);
    }
}
