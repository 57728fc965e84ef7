//! Server state and connection management.

use std::sync::Arc;

use crate::{
    domain::{CallQueueRepository, repository::ConnectionSender},
    infrastructure::collab::CollabRooms,
    usecase::ChatUseCase,
};

/// Client connection information
pub struct ClientInfo {
    /// Message sender channel
    pub sender: ConnectionSender,
    /// Unix timestamp when connected (milliseconds)
    pub connected_at: i64,
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn CallQueueRepository>,
    /// Per-shopper collaborative document rooms
    pub collab_rooms: CollabRooms,
    /// Chat assistant orchestration
    pub chat: ChatUseCase,
}
