//! Live ownership handles.

use std::sync::Arc;

use thiserror::Error;

use keyfence_store::KvStore;
use keyfence_types::{LeaseId, LeaseRecord, Timestamp};

use crate::engine::LockEngine;
use crate::error::{LockError, LockResult};

/// How a release treats stale ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// A stale lease (absent key, expired, or foreign owner) is an error.
    Strict,
    /// A stale lease is a reported non-success, not an error.
    IgnoreStale,
}

/// Error from a scoped-release block.
///
/// The block's own failure always takes priority; a release failure that
/// happened alongside it is carried, never swallowed.
#[derive(Debug, Error)]
pub enum ScopedError<E> {
    /// The guarded block failed. If releasing afterwards also failed,
    /// that failure rides along in `release_error`.
    #[error("scoped block failed: {error}")]
    Block {
        error: E,
        release_error: Option<LockError>,
    },
    /// The block succeeded but the release failed.
    #[error("release failed after successful block: {0}")]
    Release(LockError),
}

/// A held (or once-held) lease: the ownership record plus the store
/// connection to check and release it against.
///
/// There is no automatic release on drop: release does store I/O and can
/// fail meaningfully, so it stays explicit; [`LeaseHandle::scoped`] covers
/// the release-on-every-exit-path pattern without discarding failures.
#[derive(Clone)]
pub struct LeaseHandle {
    record: LeaseRecord,
    engine: LockEngine,
}

impl LeaseHandle {
    /// Wrap an ownership record with a store connection.
    pub fn new(record: LeaseRecord, store: Arc<dyn KvStore>) -> Self {
        Self {
            record,
            engine: LockEngine::new(store),
        }
    }

    /// The canonical key this lease is for.
    pub fn key(&self) -> &str {
        self.record.key()
    }

    /// This acquisition's fencing token.
    pub fn id(&self) -> &LeaseId {
        &self.record.id
    }

    /// When the acquisition was made.
    pub fn acquired_at(&self) -> Timestamp {
        self.record.acquired_at
    }

    /// The underlying ownership record.
    pub fn record(&self) -> &LeaseRecord {
        &self.record
    }

    /// Whether this handle's lease is still the key's current owner.
    ///
    /// Best-effort and advisory: there is an inherent gap between this
    /// check and any subsequent protected action. A caller needing a hard
    /// guarantee must fence the protected resource itself with the lease
    /// id, not rely on this check alone.
    pub fn still_owned(&self) -> LockResult<bool> {
        let Some(bytes) = self.engine.store().get(self.key())? else {
            return Ok(false);
        };
        let current = LeaseRecord::open(&bytes)?;
        Ok(current.id == self.record.id)
    }

    /// Like [`still_owned`](Self::still_owned), but a stale lease is the
    /// error [`LockError::Expired`].
    pub fn check_owned(&self) -> LockResult<()> {
        if self.still_owned()? {
            Ok(())
        } else {
            Err(LockError::Expired {
                key: self.key().to_string(),
                expected: self.record.id,
            })
        }
    }

    /// Release this lease iff it still owns its key.
    ///
    /// Raising-style: stale ownership is [`LockError::NotOwned`].
    pub fn release(&self) -> LockResult<()> {
        self.engine.release_expected(self.key(), &self.record.id)
    }

    /// Release this lease iff it still owns its key.
    ///
    /// Boolean-style: `Ok(true)` when released, `Ok(false)` when the
    /// lease was stale. Store and decode faults are still errors.
    pub fn try_release(&self) -> LockResult<bool> {
        match self.release() {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_owned() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Run `f` with this handle, releasing the lease on every exit path.
    ///
    /// The release runs whether the block succeeds or fails. A failing
    /// block's error is what the caller observes, with any simultaneous
    /// release failure attached; a release failure after a successful
    /// block surfaces as [`ScopedError::Release`]. Under
    /// [`ReleaseMode::IgnoreStale`], a stale lease at release time is not
    /// a failure at all.
    pub fn scoped<T, E>(
        self,
        mode: ReleaseMode,
        f: impl FnOnce(&LeaseHandle) -> Result<T, E>,
    ) -> Result<T, ScopedError<E>> {
        let outcome = f(&self);
        let release_error = match mode {
            ReleaseMode::Strict => self.release().err(),
            ReleaseMode::IgnoreStale => self.try_release().err(),
        };
        match (outcome, release_error) {
            (Ok(value), None) => Ok(value),
            (Ok(_), Some(e)) => Err(ScopedError::Release(e)),
            (Err(error), release_error) => Err(ScopedError::Block {
                error,
                release_error,
            }),
        }
    }
}

impl std::fmt::Debug for LeaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaseHandle")
            .field("key", &self.key())
            .field("id", &self.record.id)
            .finish()
    }
}
