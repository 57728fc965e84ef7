//! UseCase: collaboration ハンドシェイク処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CollaborationUseCase::request() / respond() メソッド
//! - 共有ドキュメントセッションへの入場を制御する 2 者間プロトコル
//!
//! ### なぜこのテストが必要か
//! - 通話中のペアだけが要求できることを保証（認可チェック）
//! - pending の要求に対する応答だけが受理されること
//! - 表示名の導出（rep ID の末尾から生成）の確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：要求 → 承諾 / 拒否
//! - 異常系：未割り当てペアの要求、pending 無しの応答

use std::sync::Arc;

use crate::domain::{CallQueueRepository, CollabError, CollaborationSession};

/// collaboration_request に載せる表示名を rep ID から導出する
pub fn rep_display_name(rep_id: &str) -> String {
    let suffix: String = rep_id
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("Sales Rep {suffix}")
}

/// collaboration ハンドシェイクのユースケース
pub struct CollaborationUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl CollaborationUseCase {
    /// 新しい CollaborationUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// representative からの collaboration 要求を実行
    ///
    /// # Returns
    ///
    /// * `Ok(CollaborationSession)` - pending 状態の新しいセッション
    /// * `Err(CollabError)` - ペアが通話中でない、または pending が既にある
    pub async fn request(
        &self,
        shopper_id: &str,
        rep_id: &str,
    ) -> Result<CollaborationSession, CollabError> {
        self.repository.request_collab(shopper_id, rep_id).await
    }

    /// shopper からの応答を実行
    ///
    /// # Returns
    ///
    /// * `Ok(CollaborationSession)` - accepted / rejected に遷移したセッション
    /// * `Err(CollabError::NoPendingRequest)` - pending の要求が無い
    pub async fn respond(
        &self,
        shopper_id: &str,
        rep_id: &str,
        accepted: bool,
    ) -> Result<CollaborationSession, CollabError> {
        self.repository
            .respond_collab(shopper_id, rep_id, accepted)
            .await
    }
}
