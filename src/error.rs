//! Error types for tempokv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TempoError
pub type Result<T> = std::result::Result<T, TempoError>;

/// Unified error type for tempokv operations
#[derive(Debug, Error)]
pub enum TempoError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    /// Request content failed validation before any storage access
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The storage lock could not be acquired within the busy timeout.
    /// Transient: safe for the caller to retry.
    #[error("Store busy: lock wait timed out")]
    Busy,

    /// Any other engine-level failure (I/O, corruption, schema)
    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    /// Operation attempted after the store was closed
    #[error("Store is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// SQLITE_BUSY / SQLITE_LOCKED surface as the retryable `Busy` variant;
/// everything else from the engine is a `Storage` fault.
impl From<rusqlite::Error> for TempoError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                TempoError::Busy
            }
            other => TempoError::Storage(other),
        }
    }
}
