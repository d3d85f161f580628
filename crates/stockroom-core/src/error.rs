use thiserror::Error;

use stockroom_model::EntityId;
use stockroom_persistence::{Collection, PersistenceError};

/// Store operation error.
///
/// Everything here is recoverable: callers render the message to the user
/// and carry on. `AuthFailure` stays undifferentiated so a failed login
/// does not reveal which of the two credentials was wrong.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request not found: {0}")]
    RequestNotFound(EntityId),

    #[error("material not found: {0}")]
    MaterialNotFound(EntityId),

    #[error("user not found: {0}")]
    UserNotFound(EntityId),

    #[error("insufficient stock: {available} on hand, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("invalid username or password")]
    AuthFailure,

    #[error("malformed {collection} record")]
    Decode {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
