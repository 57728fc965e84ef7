//! UseCase: shopper 切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectShopperUseCase::execute() メソッド
//! - 接続断でのエントリ保持（削除は janitor または明示的な離脱が行う）
//!
//! ### なぜこのテストが必要か
//! - 切断してもエントリと assignment が残ることを保証（猶予付き再接続）
//! - 未登録 shopper の切断で何も起きないことの確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加済み shopper の接続断
//! - エッジケース：join_queue 前に接続が閉じた場合

use std::sync::Arc;

use crate::domain::{CallQueueRepository, ShopperEntry};

/// shopper 切断のユースケース
pub struct DisconnectShopperUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl DisconnectShopperUseCase {
    /// 新しい DisconnectShopperUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// 切断マークを実行
    ///
    /// # Returns
    ///
    /// 更新後のエントリ。対象が存在しなければ None（broadcast 不要）。
    pub async fn execute(&self, shopper_id: &str) -> Option<ShopperEntry> {
        self.repository.mark_shopper_disconnected(shopper_id).await
    }
}
