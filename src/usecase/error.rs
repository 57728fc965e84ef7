//! UseCase 層のエラー定義

use thiserror::Error;

use crate::infrastructure::llm::LlmError;

/// 離脱処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeaveQueueError {
    /// 対象の shopper がキューに存在しない
    #[error("Shopper '{0}' not found in queue")]
    NotFound(String),
}

/// 通話解放処理のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReleaseCallError {
    /// 対象の shopper がキューに存在しない
    #[error("Shopper '{0}' not found in queue")]
    NotFound(String),
}

/// チャットアシスタント処理のエラー
#[derive(Debug, Error)]
pub enum ChatError {
    /// API キーが設定されておらずアシスタントが無効
    #[error("chat assistant is not configured")]
    NotConfigured,

    /// プロバイダ呼び出しの失敗
    #[error(transparent)]
    Provider(#[from] LlmError),
}
