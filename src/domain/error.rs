//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// ShopperId validation error
    #[error("ShopperId cannot be empty")]
    ShopperIdEmpty,

    /// ShopperId too long error
    #[error("ShopperId cannot exceed {max} characters (got {actual})")]
    ShopperIdTooLong { max: usize, actual: usize },

    /// RepId validation error
    #[error("RepId cannot be empty")]
    RepIdEmpty,

    /// RepId too long error
    #[error("RepId cannot exceed {max} characters (got {actual})")]
    RepIdTooLong { max: usize, actual: usize },
}

/// Errors raised when a representative tries to claim a call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// Referenced shopper does not exist in the queue
    #[error("Shopper '{0}' not found in queue")]
    NotFound(String),

    /// Shopper is already assigned to a different representative
    #[error("Shopper '{shopper_id}' is already claimed by '{rep_id}'")]
    AlreadyClaimed { shopper_id: String, rep_id: String },

    /// Claiming representative already owns another call
    #[error("Representative '{rep_id}' is already on a call with '{shopper_id}'")]
    RepBusy { rep_id: String, shopper_id: String },
}

/// Errors raised by the collaboration handshake
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollabError {
    /// Referenced shopper does not exist in the queue
    #[error("Shopper '{0}' not found in queue")]
    ShopperNotFound(String),

    /// The (shopper, representative) pair is not currently on a call
    #[error("Shopper '{shopper_id}' is not assigned to representative '{rep_id}'")]
    NotAssigned {
        shopper_id: String,
        rep_id: String,
    },

    /// A pending request for the pair already exists
    #[error("A collaboration request for shopper '{0}' is already pending")]
    RequestAlreadyPending(String),

    /// A response arrived but no pending request exists for the pair
    #[error("No pending collaboration request for shopper '{shopper_id}' from '{rep_id}'")]
    NoPendingRequest {
        shopper_id: String,
        rep_id: String,
    },
}
