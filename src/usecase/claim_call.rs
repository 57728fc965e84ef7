//! UseCase: 通話 claim 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ClaimCallUseCase::execute() メソッド
//! - representative による shopper の claim（排他制御込み）
//!
//! ### なぜこのテストが必要か
//! - 二重 claim の拒否と、失敗時に状態が変わらないことを保証
//! - 切断中の shopper も claim できること（スロット保持の仕様）の確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：待機中 shopper の claim
//! - 異常系：他 rep への割り当て済み、rep が通話中、shopper 不在
//! - エッジケース：切断中 shopper への claim

use std::sync::Arc;

use crate::domain::{CallQueueRepository, ClaimError, RepId, ShopperEntry};

/// 通話 claim のユースケース
pub struct ClaimCallUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl ClaimCallUseCase {
    /// 新しい ClaimCallUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// claim を実行
    ///
    /// # Arguments
    ///
    /// * `shopper_id` - claim 対象の shopper の ID
    /// * `rep_id` - claim する representative の ID（Domain Model）
    ///
    /// # Returns
    ///
    /// * `Ok(ShopperEntry)` - 割り当て後のエントリ
    /// * `Err(ClaimError)` - NotFound / AlreadyClaimed / RepBusy
    pub async fn execute(
        &self,
        shopper_id: &str,
        rep_id: RepId,
    ) -> Result<ShopperEntry, ClaimError> {
        self.repository.assign(shopper_id, rep_id).await
    }
}
