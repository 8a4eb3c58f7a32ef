//! The unified locking error taxonomy.

use thiserror::Error;

use keyfence_store::StoreError;
use keyfence_types::{ArityError, EnvelopeError, LeaseId};

/// Errors from locking operations.
///
/// Every protocol failure is an explicit value returned to the immediate
/// caller; nothing is logged-and-swallowed inside the engine. Store
/// connectivity failures pass through as [`LockError::Store`]; retry and
/// backoff for infrastructure faults belong to the caller.
#[derive(Debug, Error)]
pub enum LockError {
    /// Acquisition lost the arbitration race: someone else holds the key.
    /// Expected and common; the caller decides whether to retry, back
    /// off, or fail.
    #[error("lock already held: {key}")]
    AlreadyHeld { key: String },

    /// A release or ownership check found a different or absent owner:
    /// the caller's handle is stale.
    #[error("lock not owned: {key}")]
    NotOwned { key: String },

    /// The key's current owner differs from the expected lease identity.
    /// Raised by verify/reconstitute paths; a stale-ownership condition
    /// like [`LockError::NotOwned`], but distinguishable from "never
    /// existed or already gone" in release paths.
    #[error("lease expired for {key} (expected lease {expected})")]
    Expired { key: String, expected: LeaseId },

    /// Wrong argument count for the configured key arity. Raised before
    /// any store access; always a programmer or configuration bug.
    #[error(transparent)]
    Arity(#[from] ArityError),

    /// A persisted value failed envelope verification: store corruption
    /// or a cross-schema collision. Never silently coerced.
    #[error("invalid lock value: {0}")]
    Envelope(#[from] EnvelopeError),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A factory was asked to build a lock without any store connection
    /// configured.
    #[error("no store connection configured")]
    NoConnection,
}

impl LockError {
    /// True for every stale-ownership condition: [`LockError::NotOwned`]
    /// and its more specific form [`LockError::Expired`].
    pub fn is_not_owned(&self) -> bool {
        matches!(self, Self::NotOwned { .. } | Self::Expired { .. })
    }
}

/// Result alias for locking operations.
pub type LockResult<T> = Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_counts_as_not_owned() {
        let not_owned = LockError::NotOwned {
            key: "k".to_string(),
        };
        let expired = LockError::Expired {
            key: "k".to_string(),
            expected: LeaseId::new(),
        };
        assert!(not_owned.is_not_owned());
        assert!(expired.is_not_owned());
    }

    #[test]
    fn other_variants_are_not_stale_ownership() {
        let held = LockError::AlreadyHeld {
            key: "k".to_string(),
        };
        assert!(!held.is_not_owned());
        assert!(!LockError::NoConnection.is_not_owned());
        let arity = LockError::from(ArityError { expected: 2, got: 1 });
        assert!(!arity.is_not_owned());
    }
}
