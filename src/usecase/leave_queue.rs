//! UseCase: キュー離脱処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveQueueUseCase::execute() メソッド
//! - 明示的な離脱によるエントリ削除
//!
//! ### なぜこのテストが必要か
//! - 離脱の冪等性（2回目は NotFound になり、呼び出し側は broadcast しない）
//! - 削除時に関連する collaboration セッションが閉じられることの確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加済み shopper の離脱
//! - 異常系：存在しない shopper の離脱試行

use std::sync::Arc;

use crate::domain::CallQueueRepository;

use super::error::LeaveQueueError;

/// キュー離脱のユースケース
pub struct LeaveQueueUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl LeaveQueueUseCase {
    /// 新しい LeaveQueueUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// キュー離脱を実行
    ///
    /// # Returns
    ///
    /// * `Ok(())` - エントリを削除した（呼び出し側は broadcast する）
    /// * `Err(LeaveQueueError::NotFound)` - エントリが存在しない
    pub async fn execute(&self, shopper_id: &str) -> Result<(), LeaveQueueError> {
        if self.repository.remove_shopper(shopper_id).await {
            Ok(())
        } else {
            Err(LeaveQueueError::NotFound(shopper_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ShopperId;
    use crate::infrastructure::repository::InMemoryCallQueueRepository;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_leave_queue_removes_entry() {
        // テスト項目: 離脱でエントリが削除される
        // given (前提条件):
        let repository = Arc::new(InMemoryCallQueueRepository::new());
        let usecase = LeaveQueueUseCase::new(repository.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        repository
            .upsert_shopper(ShopperId::new("s1".to_string()).unwrap(), tx, true, None)
            .await;

        // when (操作):
        let result = usecase.execute("s1").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(repository.get_shopper("s1").await.is_none());
    }

    #[tokio::test]
    async fn test_leave_queue_is_idempotent() {
        // テスト項目: 2回目の離脱は NotFound（broadcast 抑制の根拠）
        // given (前提条件):
        let repository = Arc::new(InMemoryCallQueueRepository::new());
        let usecase = LeaveQueueUseCase::new(repository.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        repository
            .upsert_shopper(ShopperId::new("s1".to_string()).unwrap(), tx, true, None)
            .await;
        usecase.execute("s1").await.unwrap();

        // when (操作):
        let result = usecase.execute("s1").await;

        // then (期待する結果):
        assert_eq!(result, Err(LeaveQueueError::NotFound("s1".to_string())));
    }
}
