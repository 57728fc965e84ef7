//! UseCase: 通話解放処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ReleaseCallUseCase::execute() メソッド
//! - assignment 解除、直前 rep の返却、collaboration セッションの終了
//!
//! ### なぜこのテストが必要か
//! - call_released フレームに載せる順位と直前 rep が正しいことを保証
//! - 解放と同時にライブな collaboration セッションが ended になること
//!
//! ### どのような状況を想定しているか
//! - 正常系：割り当て済み shopper の解放
//! - エッジケース：未割り当て shopper の解放（previous は None）
//! - 異常系：存在しない shopper の解放試行

use std::sync::Arc;

use crate::domain::{CallQueueRepository, CollaborationSession, RepId, ShopperEntry};

use super::error::ReleaseCallError;

/// 解放処理の結果
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    /// 解放後のエントリ
    pub entry: ShopperEntry,
    /// 直前まで通話していた representative
    pub previous_rep_id: Option<RepId>,
    /// 解放後の待ち順位（切断中なら 0）
    pub position: usize,
    /// 終了させた collaboration セッション（あれば）
    pub ended_session: Option<CollaborationSession>,
}

/// 通話解放のユースケース
pub struct ReleaseCallUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl ReleaseCallUseCase {
    /// 新しい ReleaseCallUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// 解放を実行
    ///
    /// # Returns
    ///
    /// * `Ok(ReleaseOutcome)` - 解放後のエントリ・直前 rep・新しい待ち順位
    /// * `Err(ReleaseCallError::NotFound)` - shopper が存在しない
    pub async fn execute(&self, shopper_id: &str) -> Result<ReleaseOutcome, ReleaseCallError> {
        let (entry, previous_rep_id) = self
            .repository
            .release(shopper_id)
            .await
            .ok_or_else(|| ReleaseCallError::NotFound(shopper_id.to_string()))?;

        // 通話が終わったので、ペアのライブなセッションは ended に落とす
        let ended_session = self.repository.end_collab_for_shopper(shopper_id).await;
        let position = self.repository.position_of(shopper_id).await;

        Ok(ReleaseOutcome {
            entry,
            previous_rep_id,
            position,
            ended_session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollabStatus, ShopperId};
    use crate::infrastructure::repository::InMemoryCallQueueRepository;
    use tokio::sync::mpsc;

    fn rep(id: &str) -> RepId {
        RepId::new(id.to_string()).unwrap()
    }

    async fn join(repository: &Arc<InMemoryCallQueueRepository>, id: &str) {
        let (tx, _rx) = mpsc::unbounded_channel();
        repository
            .upsert_shopper(ShopperId::new(id.to_string()).unwrap(), tx, true, None)
            .await;
    }

    #[tokio::test]
    async fn test_release_returns_previous_rep_and_position() {
        // テスト項目: 解放で直前 rep と待ち順位が返る
        // given (前提条件): s1, s2 が参加し s1 が r1 に割り当て済み
        let repository = Arc::new(InMemoryCallQueueRepository::new());
        let usecase = ReleaseCallUseCase::new(repository.clone());
        join(&repository, "s1").await;
        join(&repository, "s2").await;
        repository.assign("s1", rep("r1")).await.unwrap();

        // when (操作):
        let outcome = usecase.execute("s1").await.unwrap();

        // then (期待する結果): s1 は到着順で再び先頭になる
        assert_eq!(outcome.previous_rep_id, Some(rep("r1")));
        assert_eq!(outcome.position, 1);
        assert!(outcome.entry.assigned_rep_id.is_none());
    }

    #[tokio::test]
    async fn test_release_ends_live_collaboration_session() {
        // テスト項目: 解放時にライブなセッションが ended になる
        // given (前提条件):
        let repository = Arc::new(InMemoryCallQueueRepository::new());
        let usecase = ReleaseCallUseCase::new(repository.clone());
        join(&repository, "s1").await;
        repository.assign("s1", rep("r1")).await.unwrap();
        repository.request_collab("s1", "r1").await.unwrap();
        repository.respond_collab("s1", "r1", true).await.unwrap();

        // when (操作):
        let outcome = usecase.execute("s1").await.unwrap();

        // then (期待する結果):
        let ended = outcome.ended_session.unwrap();
        assert_eq!(ended.status, CollabStatus::Ended);
        assert_eq!(
            repository.get_collab("s1", "r1").await.unwrap().status,
            CollabStatus::Ended
        );
    }

    #[tokio::test]
    async fn test_release_unknown_shopper_fails() {
        // テスト項目: 存在しない shopper の解放は NotFound
        // given (前提条件):
        let repository = Arc::new(InMemoryCallQueueRepository::new());
        let usecase = ReleaseCallUseCase::new(repository);

        // when (操作):
        let result = usecase.execute("ghost").await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ReleaseCallError::NotFound("ghost".to_string())
        );
    }
}
