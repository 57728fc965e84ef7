//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層（エンドポイント）から呼び出され、Domain 層を操作します。

pub mod chat;
pub mod claim_call;
pub mod collaboration;
pub mod disconnect_shopper;
pub mod error;
pub mod evict_stale;
pub mod join_queue;
pub mod leave_queue;
pub mod release_call;

pub use chat::ChatUseCase;
pub use claim_call::ClaimCallUseCase;
pub use collaboration::{CollaborationUseCase, rep_display_name};
pub use disconnect_shopper::DisconnectShopperUseCase;
pub use error::{ChatError, LeaveQueueError, ReleaseCallError};
pub use evict_stale::{EvictOutcome, EvictStaleUseCase};
pub use join_queue::{JoinOutcome, JoinQueueUseCase};
pub use leave_queue::LeaveQueueUseCase;
pub use release_call::{ReleaseCallUseCase, ReleaseOutcome};
