//! インメモリ Repository 実装
//!
//! 全ての状態はプロセスローカルで、再起動時に失われます（仕様上の設計判断）。

pub mod call_queue;
pub mod conversation;

pub use call_queue::InMemoryCallQueueRepository;
pub use conversation::InMemoryConversationStore;
