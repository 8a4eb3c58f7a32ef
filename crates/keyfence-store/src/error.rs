use thiserror::Error;

/// Errors from backing-store operations.
///
/// Connectivity and backend faults propagate to the caller untouched:
/// this layer owns no retry or backoff policy for infrastructure
/// failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation required a key that does not exist (e.g. the source of
    /// a rename).
    #[error("no such key: {key}")]
    NoSuchKey { key: String },

    /// The store connection could not be established or was lost.
    #[error("store connection failed: {0}")]
    Connection(String),

    /// The backend returned a reply the protocol does not understand.
    #[error("unexpected store reply: {0}")]
    UnexpectedReply(String),

    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
