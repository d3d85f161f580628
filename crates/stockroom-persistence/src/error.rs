//! Persistence error types.

use std::path::PathBuf;
use thiserror::Error;

use stockroom_model::EntityId;

use crate::backend::Collection;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file did not parse as JSON.
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode document data")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// No document with the given id exists in the collection.
    #[error("no {collection} document with id {id}")]
    MissingDocument { collection: Collection, id: EntityId },

    /// A stored document is missing a field the operation needs.
    #[error("malformed {collection} document {id}: {reason}")]
    MalformedDocument {
        collection: Collection,
        id: EntityId,
        reason: String,
    },

    /// Atomic replace failed (temp file could not be renamed).
    #[error("failed to replace {path}")]
    AtomicWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
