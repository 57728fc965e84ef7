//! Core domain models for the call coordination backend.

use serde::{Deserialize, Serialize};

use super::{
    error::{ClaimError, CollabError},
    value_object::{RepId, ShopperId, Timestamp},
};

/// Grace window for disconnected shoppers before the janitor evicts them
pub const DEFAULT_DISCONNECT_GRACE_MS: i64 = 60_000;

/// TTL for unanswered collaboration requests
pub const DEFAULT_COLLAB_REQUEST_TTL_MS: i64 = 300_000;

/// One shopper session known to the queue.
///
/// Connection handles live outside the entry (in the store's sender table);
/// the entry only mirrors connection liveness so it stays serializable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopperEntry {
    /// Shopper identifier (primary key)
    pub id: ShopperId,
    /// First-seen timestamp. Stable across reconnects.
    pub connected_at: Timestamp,
    /// Timestamp of the most recent disconnect, None while connected
    pub disconnected_at: Option<Timestamp>,
    /// Whether a live connection currently exists for this shopper
    pub is_connected: bool,
    /// Representative currently handling this shopper, if any
    pub assigned_rep_id: Option<RepId>,
    /// Whether the shopper reported an audio input device on join
    pub has_microphone: bool,
    /// Opaque capability record forwarded verbatim with the join
    pub media_capabilities: Option<serde_json::Value>,
}

/// Collaboration handshake status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollabStatus {
    Pending,
    Accepted,
    Rejected,
    Ended,
}

impl CollabStatus {
    /// Terminal states are sinks; only `pending` and `accepted` can still move.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CollabStatus::Rejected | CollabStatus::Ended)
    }
}

/// Collaboration handshake state for one (shopper, representative) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSession {
    pub shopper_id: ShopperId,
    pub rep_id: RepId,
    pub status: CollabStatus,
    pub requested_at: Timestamp,
    pub responded_at: Option<Timestamp>,
}

/// The call queue aggregate: every shopper entry and collaboration session,
/// with all invariant checks on the mutation paths.
///
/// The queue is the full registry (connected, disconnected, assigned entries
/// alike); the FIFO "waiting line" used for positions is the subset of
/// connected, unassigned entries ordered by `connected_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallQueue {
    /// Shopper entries in arrival order
    pub entries: Vec<ShopperEntry>,
    /// Collaboration sessions, at most one live per (shopper, rep) pair
    pub sessions: Vec<CollaborationSession>,
}

impl CallQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or revive a shopper entry.
    ///
    /// A returning shopper keeps its original `connected_at`; only liveness
    /// and capabilities are refreshed.
    pub fn upsert_shopper(
        &mut self,
        id: ShopperId,
        has_microphone: bool,
        media_capabilities: Option<serde_json::Value>,
        now: Timestamp,
    ) -> ShopperEntry {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.is_connected = true;
            entry.disconnected_at = None;
            entry.has_microphone = has_microphone;
            if media_capabilities.is_some() {
                entry.media_capabilities = media_capabilities;
            }
            return entry.clone();
        }

        let entry = ShopperEntry {
            id,
            connected_at: now,
            disconnected_at: None,
            is_connected: true,
            assigned_rep_id: None,
            has_microphone,
            media_capabilities,
        };
        self.entries.push(entry.clone());
        entry
    }

    /// Mark a shopper as disconnected without removing it.
    ///
    /// The assignment is deliberately left in place; release is explicit.
    pub fn mark_disconnected(&mut self, shopper_id: &str, now: Timestamp) -> Option<ShopperEntry> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id.as_str() == shopper_id)?;
        entry.is_connected = false;
        entry.disconnected_at = Some(now);
        Some(entry.clone())
    }

    /// Delete a shopper entry. Returns false when no such entry exists.
    pub fn remove_shopper(&mut self, shopper_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id.as_str() != shopper_id);
        self.entries.len() != before
    }

    /// Look up a shopper entry by id
    pub fn get_shopper(&self, shopper_id: &str) -> Option<&ShopperEntry> {
        self.entries.iter().find(|e| e.id.as_str() == shopper_id)
    }

    /// The shopper a representative is currently handling, if any
    pub fn rep_busy_with(&self, rep_id: &str) -> Option<&ShopperEntry> {
        self.entries
            .iter()
            .find(|e| e.assigned_rep_id.as_ref().is_some_and(|r| r.as_str() == rep_id))
    }

    /// Assign a shopper to a representative.
    ///
    /// Fails when the shopper is unknown, already claimed by someone else, or
    /// the representative already owns another call. Re-claiming an existing
    /// own assignment succeeds and changes nothing.
    pub fn assign(&mut self, shopper_id: &str, rep_id: RepId) -> Result<ShopperEntry, ClaimError> {
        let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.id.as_str() == shopper_id)
        else {
            return Err(ClaimError::NotFound(shopper_id.to_string()));
        };

        if let Some(current) = &self.entries[idx].assigned_rep_id
            && current != &rep_id
        {
            return Err(ClaimError::AlreadyClaimed {
                shopper_id: shopper_id.to_string(),
                rep_id: current.as_str().to_string(),
            });
        }

        if let Some(busy) = self.rep_busy_with(rep_id.as_str())
            && busy.id.as_str() != shopper_id
        {
            return Err(ClaimError::RepBusy {
                rep_id: rep_id.as_str().to_string(),
                shopper_id: busy.id.as_str().to_string(),
            });
        }

        self.entries[idx].assigned_rep_id = Some(rep_id);
        Ok(self.entries[idx].clone())
    }

    /// Clear a shopper's assignment.
    ///
    /// Returns the updated entry and the representative that held the call,
    /// so the caller can fabricate the downstream notification. None when the
    /// shopper is unknown.
    pub fn release(&mut self, shopper_id: &str) -> Option<(ShopperEntry, Option<RepId>)> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id.as_str() == shopper_id)?;
        let previous = entry.assigned_rep_id.take();
        Some((entry.clone(), previous))
    }

    /// 1-based rank of a shopper in the waiting line (connected, unassigned,
    /// ordered by `connected_at` ascending). 0 when the shopper is not in
    /// that subset.
    pub fn position_of(&self, shopper_id: &str) -> usize {
        let mut waiting: Vec<&ShopperEntry> = self
            .entries
            .iter()
            .filter(|e| e.is_connected && e.assigned_rep_id.is_none())
            .collect();
        waiting.sort_by_key(|e| e.connected_at);

        waiting
            .iter()
            .position(|e| e.id.as_str() == shopper_id)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// All entries in arrival order (`connected_at` ascending)
    pub fn entries_by_arrival(&self) -> Vec<ShopperEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|e| e.connected_at);
        entries
    }

    /// Find the session for a (shopper, rep) pair
    pub fn get_collab(&self, shopper_id: &str, rep_id: &str) -> Option<&CollaborationSession> {
        self.sessions
            .iter()
            .find(|s| s.shopper_id.as_str() == shopper_id && s.rep_id.as_str() == rep_id)
    }

    /// Open a collaboration request from the representative handling a shopper.
    ///
    /// Fails unless the pair is currently on a call together, or when a
    /// pending request for the pair already exists. A new request replaces a
    /// previous terminal session for the same pair.
    pub fn request_collab(
        &mut self,
        shopper_id: &str,
        rep_id: &str,
        now: Timestamp,
    ) -> Result<CollaborationSession, CollabError> {
        let entry = self
            .get_shopper(shopper_id)
            .ok_or_else(|| CollabError::ShopperNotFound(shopper_id.to_string()))?;

        let assigned = entry
            .assigned_rep_id
            .as_ref()
            .filter(|r| r.as_str() == rep_id)
            .ok_or_else(|| CollabError::NotAssigned {
                shopper_id: shopper_id.to_string(),
                rep_id: rep_id.to_string(),
            })?
            .clone();

        if let Some(existing) = self.get_collab(shopper_id, rep_id)
            && existing.status == CollabStatus::Pending
        {
            return Err(CollabError::RequestAlreadyPending(shopper_id.to_string()));
        }

        let shopper = entry.id.clone();
        self.sessions
            .retain(|s| !(s.shopper_id.as_str() == shopper_id && s.rep_id.as_str() == rep_id));

        let session = CollaborationSession {
            shopper_id: shopper,
            rep_id: assigned,
            status: CollabStatus::Pending,
            requested_at: now,
            responded_at: None,
        };
        self.sessions.push(session.clone());
        Ok(session)
    }

    /// Record the shopper's answer to a pending request
    pub fn respond_collab(
        &mut self,
        shopper_id: &str,
        rep_id: &str,
        accepted: bool,
        now: Timestamp,
    ) -> Result<CollaborationSession, CollabError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| {
                s.shopper_id.as_str() == shopper_id
                    && s.rep_id.as_str() == rep_id
                    && s.status == CollabStatus::Pending
            })
            .ok_or_else(|| CollabError::NoPendingRequest {
                shopper_id: shopper_id.to_string(),
                rep_id: rep_id.to_string(),
            })?;

        session.status = if accepted {
            CollabStatus::Accepted
        } else {
            CollabStatus::Rejected
        };
        session.responded_at = Some(now);
        Ok(session.clone())
    }

    /// Transition any live session of a shopper to `ended`.
    ///
    /// Used when the call is released or the shopper is evicted; sessions in
    /// a terminal state are left untouched.
    pub fn end_collab_for_shopper(
        &mut self,
        shopper_id: &str,
        now: Timestamp,
    ) -> Option<CollaborationSession> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.shopper_id.as_str() == shopper_id && !s.status.is_terminal())?;
        session.status = CollabStatus::Ended;
        session.responded_at = Some(now);
        Some(session.clone())
    }

    /// Janitor sweep 1: evict shoppers disconnected longer than the grace
    /// window. Live sessions of evicted shoppers are ended.
    pub fn evict_stale_shoppers(&mut self, grace_ms: i64, now: Timestamp) -> Vec<ShopperEntry> {
        let stale: Vec<ShopperEntry> = self
            .entries
            .iter()
            .filter(|e| {
                !e.is_connected
                    && e.disconnected_at
                        .is_some_and(|at| at.elapsed_ms(now) > grace_ms)
            })
            .cloned()
            .collect();

        for entry in &stale {
            self.remove_shopper(entry.id.as_str());
            self.end_collab_for_shopper(entry.id.as_str(), now);
        }
        stale
    }

    /// Janitor sweep 2: drop pending requests older than the TTL
    pub fn evict_expired_collab_requests(&mut self, ttl_ms: i64, now: Timestamp) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| {
            !(s.status == CollabStatus::Pending && s.requested_at.elapsed_ms(now) > ttl_ms)
        });
        before - self.sessions.len()
    }
}
