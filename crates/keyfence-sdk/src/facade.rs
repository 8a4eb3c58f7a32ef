//! The settings-bound lock facade.
//!
//! [`Lock`] binds a [`LockEngine`] to fixed [`LockSettings`] and converts
//! raw argument tuples into descriptors before delegating every operation
//! to the engine verbatim. It adds no protocol behavior of its own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use keyfence_lock::{LeaseHandle, LockEngine, LockError, LockResult};
use keyfence_store::{KvStore, StoreError};
use keyfence_types::{LeaseId, LockRequest, LockSettings, Timestamp};

/// Outcome of a batch acquisition, keyed by the original argument tuples.
///
/// Partial success is the contract, exactly as for
/// [`keyfence_lock::MacquireOutcome`]: nothing is rolled back when some
/// members fail.
#[derive(Debug)]
pub struct BatchAcquired {
    /// Handles for every argument tuple whose acquisition won.
    pub acquired: HashMap<Vec<String>, LeaseHandle>,
    /// The argument tuples that lost arbitration.
    pub missing: Vec<Vec<String>>,
}

/// Outcome of a batch release, keyed by the original argument tuples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReleased {
    /// Tuples whose expected lease matched and were released.
    pub released: Vec<Vec<String>>,
    /// Tuples that were absent, expired, or owned by a different lease.
    pub missing: Vec<Vec<String>>,
}

/// A lock namespace bound to a store connection.
///
/// Every method resolves its argument tuple through the namespace's key
/// formatter (failing fast with an arity error before any I/O) and then
/// delegates to the engine.
#[derive(Clone)]
pub struct Lock {
    settings: LockSettings,
    engine: LockEngine,
}

impl Lock {
    /// Bind `settings` to a store connection.
    pub fn new(settings: LockSettings, store: Arc<dyn KvStore>) -> Self {
        Self {
            settings,
            engine: LockEngine::new(store),
        }
    }

    /// Convenience constructor from the individual settings fields.
    pub fn create(
        prefix: impl Into<String>,
        ttl: Duration,
        arity: usize,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self::new(LockSettings::new(prefix, ttl, arity), store)
    }

    /// The namespace settings.
    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.settings.prefix
    }

    /// The TTL every acquisition under this namespace receives.
    pub fn ttl(&self) -> Duration {
        self.settings.ttl
    }

    /// The exact number of arguments composing a key.
    pub fn arity(&self) -> usize {
        self.settings.arity
    }

    /// The underlying protocol engine.
    pub fn engine(&self) -> &LockEngine {
        &self.engine
    }

    /// The canonical key for `args`.
    pub fn make_key<S: AsRef<str>>(&self, args: &[S]) -> LockResult<String> {
        Ok(self.settings.formatter().format(args)?)
    }

    /// Whether anyone currently holds the lock for `args`. Advisory.
    pub fn is_held<S: AsRef<str>>(&self, args: &[S]) -> LockResult<bool> {
        let key = self.make_key(args)?;
        self.engine.is_held(&key)
    }

    /// Acquire the lock for `args`.
    pub fn acquire<S: AsRef<str>>(&self, args: &[S]) -> LockResult<LeaseHandle> {
        let request = self.settings.make_request(args)?;
        self.engine.acquire(request)
    }

    /// Attempt to acquire the locks for every tuple in `args_lists` at
    /// once, in one pipelined round trip.
    ///
    /// All descriptors share one request timestamp. See [`BatchAcquired`]
    /// for the partial-success contract.
    pub fn macquire(&self, args_lists: &[Vec<String>]) -> LockResult<BatchAcquired> {
        let now = Timestamp::now();
        let mut requests: Vec<LockRequest> = Vec::with_capacity(args_lists.len());
        let mut args_by_key: HashMap<String, Vec<String>> = HashMap::with_capacity(args_lists.len());
        for args in args_lists {
            let request = self.settings.make_request_at(args, now)?;
            args_by_key.insert(request.key.clone(), args.clone());
            requests.push(request);
        }

        let outcome = self.engine.macquire(requests)?;

        let mut acquired = HashMap::with_capacity(outcome.acquired.len());
        for handle in outcome.acquired {
            let args = lookup_args(&args_by_key, handle.key())?;
            acquired.insert(args, handle);
        }
        let mut missing = Vec::with_capacity(outcome.missing.len());
        for request in outcome.missing {
            missing.push(lookup_args(&args_by_key, &request.key)?);
        }
        Ok(BatchAcquired { acquired, missing })
    }

    /// Release the lock for `args` iff its current lease id equals
    /// `expected`.
    pub fn release_expected<S: AsRef<str>>(
        &self,
        args: &[S],
        expected: &LeaseId,
    ) -> LockResult<()> {
        let key = self.make_key(args)?;
        self.engine.release_expected(&key, expected)
    }

    /// Apply [`release_expected`](Self::release_expected) independently to
    /// every `(args, expected lease)` pair.
    pub fn mrelease_expected(
        &self,
        pairs: &[(Vec<String>, LeaseId)],
    ) -> LockResult<BatchReleased> {
        let mut released = Vec::new();
        let mut missing = Vec::new();
        for (args, expected) in pairs {
            let key = self.make_key(args)?;
            match self.engine.release_expected(&key, expected) {
                Ok(()) => released.push(args.clone()),
                Err(e) if e.is_not_owned() => missing.push(args.clone()),
                Err(e) => return Err(e),
            }
        }
        Ok(BatchReleased { released, missing })
    }

    /// Unconditionally delete the lock for `args`, bypassing ownership
    /// verification. Administrative override only.
    pub fn release_hard<S: AsRef<str>>(&self, args: &[S]) -> LockResult<()> {
        let key = self.make_key(args)?;
        self.engine.release_hard(&key)
    }

    /// Reconstitute a live handle for `args` from a previously recorded
    /// lease id.
    pub fn get_handle<S: AsRef<str>>(
        &self,
        args: &[S],
        expected: &LeaseId,
    ) -> LockResult<LeaseHandle> {
        let key = self.make_key(args)?;
        self.engine.get_handle(&key, expected)
    }
}

impl std::fmt::Debug for Lock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Map an engine-reported key back to the argument tuple that produced
/// it. Keys are derived deterministically from the tuples, so a miss
/// means the store returned a key this call never issued.
fn lookup_args(
    args_by_key: &HashMap<String, Vec<String>>,
    key: &str,
) -> LockResult<Vec<String>> {
    args_by_key.get(key).cloned().ok_or_else(|| {
        LockError::Store(StoreError::UnexpectedReply(format!(
            "batch outcome references unrequested key {key}"
        )))
    })
}
