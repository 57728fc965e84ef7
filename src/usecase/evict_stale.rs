//! UseCase: janitor sweep 処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - EvictStaleUseCase::execute() メソッド
//! - 猶予超過した切断済み shopper と期限切れ collaboration 要求の掃除
//!
//! ### なぜこのテストが必要か
//! - broadcast の要否（evict があった時だけ）を呼び出し側が判定できること
//! - 接続中エントリや応答済みセッションが巻き込まれないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：期限超過エントリの evict
//! - エッジケース：掃除対象なし（broadcast 不要）

use std::sync::Arc;

use crate::domain::{CallQueueRepository, ShopperEntry};

/// sweep の結果
#[derive(Debug, Clone)]
pub struct EvictOutcome {
    /// 削除された shopper エントリ
    pub evicted: Vec<ShopperEntry>,
    /// 破棄された期限切れ collaboration 要求の数
    pub expired_requests: usize,
}

impl EvictOutcome {
    /// キューの観測状態が変化したか（broadcast が必要か）
    pub fn queue_changed(&self) -> bool {
        !self.evicted.is_empty()
    }
}

/// janitor sweep のユースケース
pub struct EvictStaleUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn CallQueueRepository>,
}

impl EvictStaleUseCase {
    /// 新しい EvictStaleUseCase を作成
    pub fn new(repository: Arc<dyn CallQueueRepository>) -> Self {
        Self { repository }
    }

    /// 2 つの sweep を実行
    ///
    /// # Arguments
    ///
    /// * `grace_ms` - 切断済み shopper を保持する猶予（ミリ秒）
    /// * `ttl_ms` - pending な collaboration 要求の生存期間（ミリ秒）
    pub async fn execute(&self, grace_ms: i64, ttl_ms: i64) -> EvictOutcome {
        let evicted = self.repository.evict_stale_shoppers(grace_ms).await;
        let expired_requests = self.repository.evict_expired_collab_requests(ttl_ms).await;

        EvictOutcome {
            evicted,
            expired_requests,
        }
    }
}
