//! The protocol core: atomic acquisition and optimistic release.

use std::sync::Arc;

use tracing::debug;

use keyfence_store::{
    KvCommand, KvReply, KvStore, StoreError, TxnOutcome, WatchToken, WatchedValue,
};
use keyfence_types::{LeaseId, LeaseRecord, LockRequest, Timestamp};

use crate::error::{LockError, LockResult};
use crate::handle::LeaseHandle;

/// Outcome of a batch acquisition.
///
/// Partial success is the contract: members that won their rename are
/// `acquired`, every other request is `missing`, and nothing is rolled
/// back when some members fail. Cross-key atomicity is deliberately not
/// promised; the caller owns the decision to keep or release the
/// acquired subset (e.g. via [`LockEngine::mrelease_expected`]).
#[derive(Debug)]
pub struct MacquireOutcome {
    /// Handles for every key whose acquisition won.
    pub acquired: Vec<LeaseHandle>,
    /// The requests that lost arbitration.
    pub missing: Vec<LockRequest>,
}

/// Outcome of a batch release: keys released vs. keys whose lease no
/// longer matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MreleaseOutcome {
    /// Keys whose expected lease matched and were deleted.
    pub released: Vec<String>,
    /// Keys that were absent, expired, or owned by a different lease.
    pub missing: Vec<String>,
}

/// States of the optimistic release sequence.
///
/// Every transition is explicit so the conflict-retry edge and the
/// terminal owner-mismatch edge are visible; each `Read` is a fresh round
/// trip and the natural cancellation point for cooperative callers.
enum ReleaseState {
    /// Take a watched snapshot of the key.
    Read,
    /// Decode and compare the snapshot against the expected lease.
    Validate(WatchedValue),
    /// Commit the delete, fenced by the watch token.
    Commit(WatchToken),
}

/// The locking protocol, bound to one store connection.
///
/// Stateless between calls and safe for concurrent use from independent
/// threads and processes talking to the same store: all mutual exclusion
/// is enforced by the store's atomic primitives. Every method touching
/// the store may block on network I/O.
#[derive(Clone)]
pub struct LockEngine {
    store: Arc<dyn KvStore>,
}

impl LockEngine {
    /// Bind an engine to a store connection.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// The underlying store connection.
    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    /// Whether anyone currently holds the lock at `key`.
    ///
    /// A pure read with no side effect, and advisory by nature: the
    /// answer can be stale by the time the caller acts on it.
    pub fn is_held(&self, key: &str) -> LockResult<bool> {
        Ok(self.store.get(key)?.is_some())
    }

    /// Acquire the lock described by `request`.
    ///
    /// A fresh [`LeaseId`] is generated for the attempt and a sealed
    /// [`LeaseRecord`] is staged under a private attempt key with the
    /// request's TTL, then atomically renamed onto the canonical key iff
    /// that key is vacant. Both commands travel in one pipelined round
    /// trip. The rename preserves the TTL and is the arbitration point:
    /// of any set of concurrent attempts on one key, exactly one rename
    /// succeeds.
    ///
    /// On success the record becomes the caller's handle. On defeat the
    /// attempt fails with [`LockError::AlreadyHeld`]; the orphaned
    /// staging key still carries its TTL and self-expires unread.
    pub fn acquire(&self, request: LockRequest) -> LockResult<LeaseHandle> {
        let record = LeaseRecord::new(request, LeaseId::new(), Timestamp::now());
        let mut commands = Vec::with_capacity(2);
        push_stage_commands(&mut commands, &record)?;
        let replies = self.store.pipeline(&commands)?;
        if rename_won(&replies, 1)? {
            debug!(key = record.key(), lease = %record.id, "lock acquired");
            Ok(LeaseHandle::new(record, Arc::clone(&self.store)))
        } else {
            debug!(key = record.key(), "lock already held");
            Err(LockError::AlreadyHeld {
                key: record.key().to_string(),
            })
        }
    }

    /// Attempt to acquire every lock in `requests` at once.
    ///
    /// All records share one acquisition timestamp, and every stage+rename
    /// pair is pipelined into a single round trip. Each key's rename
    /// outcome is independent, so no cross-key transaction is needed.
    /// See [`MacquireOutcome`] for the partial-success contract.
    pub fn macquire(&self, requests: Vec<LockRequest>) -> LockResult<MacquireOutcome> {
        let now = Timestamp::now();
        let records: Vec<LeaseRecord> = requests
            .into_iter()
            .map(|request| LeaseRecord::new(request, LeaseId::new(), now))
            .collect();

        let mut commands = Vec::with_capacity(records.len() * 2);
        for record in &records {
            push_stage_commands(&mut commands, record)?;
        }
        let replies = self.store.pipeline(&commands)?;

        let mut acquired = Vec::new();
        let mut missing = Vec::new();
        for (i, record) in records.into_iter().enumerate() {
            if rename_won(&replies, 2 * i + 1)? {
                acquired.push(LeaseHandle::new(record, Arc::clone(&self.store)));
            } else {
                missing.push(record.request);
            }
        }
        debug!(
            acquired = acquired.len(),
            missing = missing.len(),
            "batch acquire partitioned"
        );
        Ok(MacquireOutcome { acquired, missing })
    }

    /// Release the lock at `key` iff its current lease id equals
    /// `expected`.
    ///
    /// Runs the optimistic compare-and-delete sequence: a watched read,
    /// envelope decode, lease comparison, then a delete fenced by the
    /// watch token. When the store reports that the key changed between
    /// read and commit, the whole sequence restarts with a fresh read:
    /// unbounded, but each conflict means another party just modified the
    /// key, which a mismatch check then resolves terminally. A mismatch
    /// (absent, expired, or foreign owner) fails with
    /// [`LockError::NotOwned`] without mutating the store.
    pub fn release_expected(&self, key: &str, expected: &LeaseId) -> LockResult<()> {
        let mut state = ReleaseState::Read;
        loop {
            state = match state {
                ReleaseState::Read => ReleaseState::Validate(self.store.watch_get(key)?),
                ReleaseState::Validate(read) => {
                    let Some(bytes) = read.value else {
                        return Err(LockError::NotOwned {
                            key: key.to_string(),
                        });
                    };
                    let current = LeaseRecord::open(&bytes)?;
                    if current.id != *expected {
                        return Err(LockError::NotOwned {
                            key: key.to_string(),
                        });
                    }
                    ReleaseState::Commit(read.token)
                }
                ReleaseState::Commit(token) => match self.store.commit_delete(key, token)? {
                    TxnOutcome::Committed => {
                        debug!(key, lease = %expected, "lock released");
                        return Ok(());
                    }
                    TxnOutcome::Conflict => {
                        debug!(key, "release commit conflicted; retrying");
                        ReleaseState::Read
                    }
                },
            };
        }
    }

    /// Apply [`release_expected`](Self::release_expected) independently to
    /// every `(key, expected lease)` pair.
    ///
    /// A stale-ownership failure on one key never blocks the others; keys
    /// partition into released and missing. Store faults are not
    /// partitioned away: infrastructure errors abort and propagate.
    pub fn mrelease_expected(&self, pairs: &[(String, LeaseId)]) -> LockResult<MreleaseOutcome> {
        let mut released = Vec::new();
        let mut missing = Vec::new();
        for (key, expected) in pairs {
            match self.release_expected(key, expected) {
                Ok(()) => released.push(key.clone()),
                Err(e) if e.is_not_owned() => missing.push(key.clone()),
                Err(e) => return Err(e),
            }
        }
        Ok(MreleaseOutcome { released, missing })
    }

    /// Unconditionally delete the lock at `key`, bypassing ownership
    /// verification.
    ///
    /// An administrative override, not a normal release: it can destroy a
    /// lease some other party legitimately holds. Fails with
    /// [`LockError::NotOwned`] if the key was already absent.
    pub fn release_hard(&self, key: &str) -> LockResult<()> {
        if self.store.delete(key)? {
            debug!(key, "lock force-released");
            Ok(())
        } else {
            Err(LockError::NotOwned {
                key: key.to_string(),
            })
        }
    }

    /// Reconstitute a live handle for an ownership acquired elsewhere,
    /// e.g. in a process that restarted after recording its lease id.
    ///
    /// Fails with [`LockError::Expired`] when the key is absent or its
    /// current lease id differs from `expected`.
    pub fn get_handle(&self, key: &str, expected: &LeaseId) -> LockResult<LeaseHandle> {
        let Some(bytes) = self.store.get(key)? else {
            return Err(LockError::Expired {
                key: key.to_string(),
                expected: *expected,
            });
        };
        let record = LeaseRecord::open(&bytes)?;
        if record.id != *expected {
            return Err(LockError::Expired {
                key: key.to_string(),
                expected: *expected,
            });
        }
        Ok(LeaseHandle::new(record, Arc::clone(&self.store)))
    }

    /// Unconditionally install `record` at its canonical key, bypassing
    /// arbitration entirely. Diagnostic and test tool only, never part
    /// of the normal protocol.
    pub fn debug_force_set(&self, record: &LeaseRecord) -> LockResult<()> {
        let sealed = record.seal()?;
        self.store
            .set_with_ttl(record.key(), &sealed, record.request.ttl)?;
        Ok(())
    }
}

impl std::fmt::Debug for LockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockEngine").finish_non_exhaustive()
    }
}

/// Append the stage-then-promote command pair for one record.
fn push_stage_commands(commands: &mut Vec<KvCommand>, record: &LeaseRecord) -> LockResult<()> {
    let sealed = record.seal()?;
    commands.push(KvCommand::SetWithTtl {
        key: record.staging_key(),
        value: sealed,
        ttl: record.request.ttl,
    });
    commands.push(KvCommand::RenameIfVacant {
        src: record.staging_key(),
        dst: record.key().to_string(),
    });
    Ok(())
}

/// Extract the rename outcome at `index` from a pipeline reply set.
fn rename_won(replies: &[KvReply], index: usize) -> LockResult<bool> {
    match replies.get(index) {
        Some(KvReply::Renamed(won)) => Ok(*won),
        other => Err(LockError::Store(StoreError::UnexpectedReply(format!(
            "expected a rename reply at offset {index}, got {other:?}"
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use keyfence_store::{InMemoryKvStore, StoreResult};
    use keyfence_types::LockSettings;

    fn settings() -> LockSettings {
        LockSettings::new("test", Duration::from_secs(20), 1)
    }

    fn engine_over(store: Arc<InMemoryKvStore>) -> LockEngine {
        LockEngine::new(store)
    }

    fn request(s: &LockSettings, arg: &str) -> LockRequest {
        s.make_request(&[arg]).unwrap()
    }

    // -----------------------------------------------------------------------
    // Mutual exclusion
    // -----------------------------------------------------------------------

    #[test]
    fn acquire_then_acquire_fails_until_released() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();

        let handle = engine.acquire(request(&s, "x")).unwrap();
        let err = engine.acquire(request(&s, "x")).unwrap_err();
        assert!(matches!(err, LockError::AlreadyHeld { ref key } if key == handle.key()));

        // A second engine over the same store loses too.
        let other = engine_over(Arc::clone(&store));
        assert!(matches!(
            other.acquire(request(&s, "x")),
            Err(LockError::AlreadyHeld { .. })
        ));

        handle.release().unwrap();
        let handle2 = engine.acquire(request(&s, "x")).unwrap();
        assert!(matches!(
            engine.acquire(request(&s, "x")),
            Err(LockError::AlreadyHeld { .. })
        ));
        drop(handle2);
    }

    #[test]
    fn different_keys_do_not_contend() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let a = engine.acquire(request(&s, "a")).unwrap();
        let b = engine.acquire(request(&s, "b")).unwrap();
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn is_held_tracks_the_canonical_key() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let key = s.make_request(&["x"]).unwrap().key;

        assert!(!engine.is_held(&key).unwrap());
        let handle = engine.acquire(request(&s, "x")).unwrap();
        assert!(engine.is_held(&key).unwrap());
        handle.release().unwrap();
        assert!(!engine.is_held(&key).unwrap());
    }

    // -----------------------------------------------------------------------
    // Lease identity / fencing
    // -----------------------------------------------------------------------

    #[test]
    fn sequential_acquisitions_get_distinct_leases() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();

        let first = engine.acquire(request(&s, "x")).unwrap();
        let first_id = *first.id();
        // Someone force-clears the key (say, an operator).
        store.delete(first.key()).unwrap();
        let second = engine.acquire(request(&s, "x")).unwrap();

        assert_ne!(first_id, *second.id());
        assert!(second.still_owned().unwrap());
        assert!(!first.still_owned().unwrap());
    }

    #[test]
    fn staging_keys_do_not_linger_after_a_win() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();
        // The staging key was renamed away; only the canonical key lives.
        assert_eq!(store.len(), 1);
        assert!(store.get(handle.key()).unwrap().is_some());
    }

    #[test]
    fn a_lost_attempt_leaves_only_a_self_expiring_orphan() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();
        let _winner = engine.acquire(request(&s, "x")).unwrap();
        let _ = engine.acquire(request(&s, "x")).unwrap_err();
        // Loser's staging key is still there, carrying its own TTL.
        assert_eq!(store.len(), 2);
        store.advance(Duration::from_secs(21));
        assert_eq!(store.len(), 0);
    }

    // -----------------------------------------------------------------------
    // TTL expiry
    // -----------------------------------------------------------------------

    #[test]
    fn ownership_lapses_when_the_ttl_expires() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();

        let handle = engine.acquire(request(&s, "x")).unwrap();
        store.advance(Duration::from_secs(21));

        assert!(!engine.is_held(handle.key()).unwrap());
        assert!(!handle.still_owned().unwrap());
        // And the key is up for grabs again.
        let again = engine.acquire(request(&s, "x")).unwrap();
        assert!(again.still_owned().unwrap());
    }

    #[test]
    fn the_rename_preserves_the_staging_ttl() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();
        let remaining = store.remaining_ttl(handle.key()).unwrap();
        assert!(remaining <= Duration::from_secs(20));
        assert!(remaining > Duration::from_secs(19));
    }

    // -----------------------------------------------------------------------
    // Batch acquire
    // -----------------------------------------------------------------------

    #[test]
    fn macquire_with_everything_free_acquires_everything() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let requests = vec![request(&s, "x"), request(&s, "y"), request(&s, "z")];

        let outcome = engine.macquire(requests).unwrap();
        assert_eq!(outcome.acquired.len(), 3);
        assert!(outcome.missing.is_empty());
        for handle in &outcome.acquired {
            assert!(handle.still_owned().unwrap());
        }
    }

    #[test]
    fn macquire_reports_preheld_members_as_missing() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let existing = engine.acquire(request(&s, "y")).unwrap();

        let outcome = engine
            .macquire(vec![request(&s, "x"), request(&s, "y"), request(&s, "z")])
            .unwrap();

        let acquired_keys: Vec<&str> = outcome.acquired.iter().map(|h| h.key()).collect();
        assert_eq!(outcome.missing.len(), 1);
        assert_eq!(outcome.missing[0].key, existing.key());
        assert_eq!(acquired_keys.len(), 2);
        assert!(acquired_keys.contains(&"keyfence:test:x"));
        assert!(acquired_keys.contains(&"keyfence:test:z"));
        // The pre-held lease is untouched.
        assert!(existing.still_owned().unwrap());
    }

    #[test]
    fn macquire_members_share_one_acquisition_timestamp() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let outcome = engine
            .macquire(vec![request(&s, "x"), request(&s, "y")])
            .unwrap();
        let stamps: Vec<_> = outcome
            .acquired
            .iter()
            .map(|h| h.record().acquired_at)
            .collect();
        assert_eq!(stamps[0], stamps[1]);
    }

    // -----------------------------------------------------------------------
    // Release
    // -----------------------------------------------------------------------

    #[test]
    fn release_expected_with_matching_lease_deletes_the_key() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        engine.release_expected(handle.key(), handle.id()).unwrap();
        assert!(!engine.is_held(handle.key()).unwrap());
    }

    #[test]
    fn release_expected_with_foreign_lease_is_not_owned_and_mutates_nothing() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        let err = engine
            .release_expected(handle.key(), &LeaseId::new())
            .unwrap_err();
        assert!(matches!(err, LockError::NotOwned { .. }));
        // The true owner is untouched.
        assert!(handle.still_owned().unwrap());
    }

    #[test]
    fn release_expected_on_an_absent_key_is_not_owned() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let err = engine
            .release_expected("keyfence:test:ghost", &LeaseId::new())
            .unwrap_err();
        assert!(matches!(err, LockError::NotOwned { .. }));
    }

    #[test]
    fn mrelease_partitions_per_key() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let a = engine.acquire(request(&s, "a")).unwrap();
        let b = engine.acquire(request(&s, "b")).unwrap();

        let pairs = vec![
            (a.key().to_string(), *a.id()),
            (b.key().to_string(), LeaseId::new()), // wrong lease
            ("keyfence:test:ghost".to_string(), LeaseId::new()),
        ];
        let outcome = engine.mrelease_expected(&pairs).unwrap();
        assert_eq!(outcome.released, vec![a.key().to_string()]);
        assert_eq!(
            outcome.missing,
            vec![b.key().to_string(), "keyfence:test:ghost".to_string()]
        );
        // b's lease survived the failed release.
        assert!(b.still_owned().unwrap());
    }

    #[test]
    fn release_hard_ignores_ownership() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        engine.release_hard(handle.key()).unwrap();
        assert!(!handle.still_owned().unwrap());

        let err = engine.release_hard(handle.key()).unwrap_err();
        assert!(matches!(err, LockError::NotOwned { .. }));
    }

    // -----------------------------------------------------------------------
    // Conflict retry
    // -----------------------------------------------------------------------

    /// Store wrapper that reports a conflict for the first N commits, to
    /// drive the release sequence around its retry edge.
    struct ConflictingStore {
        inner: InMemoryKvStore,
        conflicts_left: AtomicUsize,
    }

    impl ConflictingStore {
        fn new(conflicts: usize) -> Self {
            Self {
                inner: InMemoryKvStore::new(),
                conflicts_left: AtomicUsize::new(conflicts),
            }
        }
    }

    impl KvStore for ConflictingStore {
        fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
            self.inner.get(key)
        }
        fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
            self.inner.set_with_ttl(key, value, ttl)
        }
        fn rename_if_vacant(&self, src: &str, dst: &str) -> StoreResult<bool> {
            self.inner.rename_if_vacant(src, dst)
        }
        fn delete(&self, key: &str) -> StoreResult<bool> {
            self.inner.delete(key)
        }
        fn watch_get(&self, key: &str) -> StoreResult<WatchedValue> {
            self.inner.watch_get(key)
        }
        fn commit_delete(&self, key: &str, token: WatchToken) -> StoreResult<TxnOutcome> {
            if self
                .conflicts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Ok(TxnOutcome::Conflict);
            }
            self.inner.commit_delete(key, token)
        }
    }

    #[test]
    fn release_retries_through_transient_conflicts() {
        let store = Arc::new(ConflictingStore::new(3));
        let engine = LockEngine::new(store);
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        // Three injected conflicts, then the commit goes through.
        engine.release_expected(handle.key(), handle.id()).unwrap();
        assert!(!engine.is_held(handle.key()).unwrap());
    }

    // -----------------------------------------------------------------------
    // Handle reconstitution / corruption
    // -----------------------------------------------------------------------

    #[test]
    fn get_handle_reconstitutes_a_live_lease() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();
        let original = engine.acquire(request(&s, "x")).unwrap();

        // A different process, knowing only the key and the lease id.
        let other_engine = engine_over(store);
        let reborn = other_engine
            .get_handle(original.key(), original.id())
            .unwrap();
        assert_eq!(reborn.id(), original.id());
        assert!(reborn.still_owned().unwrap());
    }

    #[test]
    fn get_handle_with_wrong_lease_is_expired() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        let err = engine.get_handle(handle.key(), &LeaseId::new()).unwrap_err();
        assert!(matches!(err, LockError::Expired { .. }));
        assert!(err.is_not_owned());
    }

    #[test]
    fn get_handle_on_an_absent_key_is_expired() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let err = engine
            .get_handle("keyfence:test:ghost", &LeaseId::new())
            .unwrap_err();
        assert!(matches!(err, LockError::Expired { .. }));
    }

    #[test]
    fn a_corrupted_value_fails_loudly_everywhere() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(Arc::clone(&store));
        let s = settings();
        let handle = engine.acquire(request(&s, "x")).unwrap();

        // Some foreign writer scribbles over the canonical key.
        store
            .set_with_ttl(handle.key(), b"scribble", Duration::from_secs(20))
            .unwrap();

        assert!(matches!(
            handle.still_owned(),
            Err(LockError::Envelope(_))
        ));
        assert!(matches!(
            engine.release_expected(handle.key(), handle.id()),
            Err(LockError::Envelope(_))
        ));
        assert!(matches!(
            engine.get_handle(handle.key(), handle.id()),
            Err(LockError::Envelope(_))
        ));
    }

    #[test]
    fn debug_force_set_installs_a_record_verbatim() {
        let store = Arc::new(InMemoryKvStore::new());
        let engine = engine_over(store);
        let s = settings();
        let record = LeaseRecord::new(request(&s, "x"), LeaseId::new(), Timestamp::now());

        engine.debug_force_set(&record).unwrap();
        let handle = engine.get_handle(record.key(), &record.id).unwrap();
        assert!(handle.still_owned().unwrap());
    }
}
