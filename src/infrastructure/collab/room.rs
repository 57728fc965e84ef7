//! Document room: authoritative Yrs doc + per-peer fan-out.
//!
//! Each room maintains:
//! - A Yrs `Doc` accumulating every update, so a late joiner can be
//!   fast-forwarded with a single state update
//! - The set of connected peers, each with its outbound byte channel
//!
//! Update payloads are opaque to the rest of the system; merge/conflict
//! resolution is the document engine's job on both ends.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc::UnboundedSender};
use uuid::Uuid;
use yrs::updates::decoder::Decode;
use yrs::{Doc, ReadTxn, StateVector, Transact, Update};

/// Errors raised while relaying document updates
#[derive(Debug, Error)]
pub enum RoomError {
    /// The payload is not a decodable v1 document update
    #[error("invalid document update: {0}")]
    InvalidUpdate(String),
}

/// One shopper's document room
pub struct DocRoom {
    /// Authoritative document state
    doc: Mutex<Doc>,
    /// Connected peers and their outbound channels
    peers: Mutex<HashMap<Uuid, UnboundedSender<Vec<u8>>>>,
}

impl DocRoom {
    fn new() -> Self {
        Self {
            doc: Mutex::new(Doc::new()),
            peers: Mutex::new(HashMap::new()),
        }
    }

    /// Register a peer and return the catch-up update encoding the full
    /// current document state.
    pub async fn join(&self, peer_id: Uuid, sender: UnboundedSender<Vec<u8>>) -> Vec<u8> {
        let catch_up = {
            let doc = self.doc.lock().await;
            let txn = doc.transact();
            txn.encode_state_as_update_v1(&StateVector::default())
        };
        let mut peers = self.peers.lock().await;
        peers.insert(peer_id, sender);
        catch_up
    }

    /// Remove a peer. Returns the number of peers still in the room.
    pub async fn leave(&self, peer_id: &Uuid) -> usize {
        let mut peers = self.peers.lock().await;
        peers.remove(peer_id);
        peers.len()
    }

    /// Apply one inbound update to the authoritative doc and forward it to
    /// every other peer. Returns the number of peers it was forwarded to.
    pub async fn apply_and_forward(
        &self,
        from: &Uuid,
        update: Vec<u8>,
    ) -> Result<usize, RoomError> {
        {
            let doc = self.doc.lock().await;
            let decoded = Update::decode_v1(&update)
                .map_err(|e| RoomError::InvalidUpdate(e.to_string()))?;
            let mut txn = doc.transact_mut();
            txn.apply_update(decoded)
                .map_err(|e| RoomError::InvalidUpdate(e.to_string()))?;
        }

        let peers = self.peers.lock().await;
        let mut forwarded = 0;
        for (peer_id, sender) in peers.iter() {
            if peer_id == from {
                continue;
            }
            if sender.send(update.clone()).is_err() {
                tracing::warn!("Failed to forward document update to peer '{}'", peer_id);
            } else {
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }

    /// Current peer count
    pub async fn peer_count(&self) -> usize {
        self.peers.lock().await.len()
    }
}

/// Room registry: maps shopper ids to document rooms.
///
/// Rooms are created on first connection and torn down when the last peer
/// leaves.
pub struct CollabRooms {
    rooms: Mutex<HashMap<String, Arc<DocRoom>>>,
}

impl CollabRooms {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create the room for a shopper
    pub async fn get_or_create(&self, shopper_id: &str) -> Arc<DocRoom> {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(shopper_id.to_string())
            .or_insert_with(|| Arc::new(DocRoom::new()))
            .clone()
    }

    /// Remove the room when it has no peers left. Returns true if removed.
    pub async fn remove_if_empty(&self, shopper_id: &str) -> bool {
        let mut rooms = self.rooms.lock().await;
        if let Some(room) = rooms.get(shopper_id)
            && room.peer_count().await == 0
        {
            rooms.remove(shopper_id);
            return true;
        }
        false
    }

    /// Number of active rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

impl Default for CollabRooms {
    fn default() -> Self {
        Self::new()
    }
}
