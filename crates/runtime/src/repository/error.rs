//! Error types raised by world-storage implementations.

use thiserror::Error;

/// Errors surfaced by world-storage implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("world storage lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted data under '{key}': {reason}")]
    CorruptedData { key: String, reason: String },

    #[error("record under '{key}' has version {found}, expected {expected}")]
    VersionMismatch {
        key: String,
        found: u8,
        expected: u8,
    },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
