//! Repository trait for the call queue state store.
//!
//! The store is the single owner of all shopper entries, representative
//! connections, and collaboration sessions. Every operation is atomic with
//! respect to every other; callers never hold references across await points.

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use super::{
    entity::{CollaborationSession, ShopperEntry},
    error::{ClaimError, CollabError},
    value_object::{RepId, ShopperId},
};

/// Outbound channel handle for one WebSocket connection.
///
/// Frames are pre-encoded JSON strings; the connection's send task drains
/// the channel and writes to the socket.
pub type ConnectionSender = UnboundedSender<String>;

/// State store contract for the call queue.
#[async_trait]
pub trait CallQueueRepository: Send + Sync {
    /// Create or revive a shopper entry and bind its live connection.
    /// `connected_at` is never rewritten for a returning shopper.
    async fn upsert_shopper(
        &self,
        shopper_id: ShopperId,
        sender: ConnectionSender,
        has_microphone: bool,
        media_capabilities: Option<serde_json::Value>,
    ) -> ShopperEntry;

    /// Mark a shopper disconnected and drop its connection handle.
    /// The entry (and any assignment) stays until removed explicitly.
    async fn mark_shopper_disconnected(&self, shopper_id: &str) -> Option<ShopperEntry>;

    /// Delete a shopper entry outright. Live collaboration sessions of the
    /// shopper are transitioned to `ended`.
    async fn remove_shopper(&self, shopper_id: &str) -> bool;

    /// Look up a shopper entry by id
    async fn get_shopper(&self, shopper_id: &str) -> Option<ShopperEntry>;

    /// Register a representative connection
    async fn register_rep(&self, rep_id: RepId, sender: ConnectionSender);

    /// Remove a representative connection
    async fn unregister_rep(&self, rep_id: &str);

    /// The shopper id a representative is currently handling, if any
    async fn rep_busy_with(&self, rep_id: &str) -> Option<String>;

    /// Assign a shopper to a representative (the claim operation)
    async fn assign(&self, shopper_id: &str, rep_id: RepId) -> Result<ShopperEntry, ClaimError>;

    /// Clear a shopper's assignment, returning the entry and the previous rep
    async fn release(&self, shopper_id: &str) -> Option<(ShopperEntry, Option<RepId>)>;

    /// All entries in arrival order, cloned out of the store
    async fn snapshot(&self) -> Vec<ShopperEntry>;

    /// 1-based waiting-line rank; 0 when not currently waiting
    async fn position_of(&self, shopper_id: &str) -> usize;

    /// Open a collaboration request for an assigned pair
    async fn request_collab(
        &self,
        shopper_id: &str,
        rep_id: &str,
    ) -> Result<CollaborationSession, CollabError>;

    /// Record the shopper's answer to a pending collaboration request
    async fn respond_collab(
        &self,
        shopper_id: &str,
        rep_id: &str,
        accepted: bool,
    ) -> Result<CollaborationSession, CollabError>;

    /// End any live collaboration session of a shopper
    async fn end_collab_for_shopper(&self, shopper_id: &str) -> Option<CollaborationSession>;

    /// Find the collaboration session for a pair
    async fn get_collab(&self, shopper_id: &str, rep_id: &str) -> Option<CollaborationSession>;

    /// Janitor sweep: evict shoppers disconnected longer than `grace_ms`
    async fn evict_stale_shoppers(&self, grace_ms: i64) -> Vec<ShopperEntry>;

    /// Janitor sweep: drop pending collaboration requests older than `ttl_ms`
    async fn evict_expired_collab_requests(&self, ttl_ms: i64) -> usize;

    /// Connection handle of a shopper, if currently connected
    async fn shopper_sender(&self, shopper_id: &str) -> Option<ConnectionSender>;

    /// Connection handle of a representative, if currently connected
    async fn rep_sender(&self, rep_id: &str) -> Option<ConnectionSender>;

    /// All representative connections, for queue_update fan-out
    async fn rep_senders(&self) -> Vec<(String, ConnectionSender)>;
}
