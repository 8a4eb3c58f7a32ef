//! In-memory key-value store for testing and ephemeral use.
//!
//! [`InMemoryKvStore`] keeps all entries in a `HashMap` behind a `RwLock`
//! and implements the full [`KvStore`] trait: TTL expiry, TTL-preserving
//! rename-if-vacant, and stamp-fenced optimistic commits. Expiry is
//! driven by a monotonic clock the store owns; tests advance it with
//! [`InMemoryKvStore::advance`] instead of sleeping.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{KvStore, TxnOutcome, WatchToken, WatchedValue};

struct Entry {
    value: Vec<u8>,
    /// Deadline on the store clock (offset from `epoch`).
    expires_at: Duration,
}

struct Inner {
    entries: HashMap<String, Entry>,
    /// Per-key modification stamps backing the watch tokens. Stamps
    /// survive deletion: create-delete-create cycles must not reissue an
    /// old stamp.
    stamps: HashMap<String, u64>,
    next_stamp: u64,
    /// Test-controlled offset added to the real elapsed time.
    clock_skip: Duration,
}

impl Inner {
    fn bump(&mut self, key: &str) {
        self.next_stamp += 1;
        self.stamps.insert(key.to_string(), self.next_stamp);
    }

    fn stamp_of(&self, key: &str) -> u64 {
        self.stamps.get(key).copied().unwrap_or(0)
    }

    /// Drop the entry if its deadline has passed. Expiry is a
    /// modification: a watcher must observe it as one.
    fn expire(&mut self, key: &str, now: Duration) {
        let expired = matches!(self.entries.get(key), Some(e) if e.expires_at <= now);
        if expired {
            self.entries.remove(key);
            self.bump(key);
            debug!(key, "expired key purged");
        }
    }
}

/// An in-memory implementation of [`KvStore`].
///
/// All data lives behind a `RwLock` and is lost when the store is
/// dropped. Reads take the write lock so expired entries can be purged
/// lazily on access.
pub struct InMemoryKvStore {
    inner: RwLock<Inner>,
    epoch: Instant,
}

impl InMemoryKvStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                stamps: HashMap::new(),
                next_stamp: 0,
                clock_skip: Duration::ZERO,
            }),
            epoch: Instant::now(),
        }
    }

    fn now(&self, inner: &Inner) -> Duration {
        self.epoch.elapsed() + inner.clock_skip
    }

    /// Advance the store's clock, expiring anything whose TTL elapses.
    ///
    /// Lets tests exercise expiry without sleeping.
    pub fn advance(&self, d: Duration) {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.clock_skip += d;
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        let keys: Vec<String> = inner.entries.keys().cloned().collect();
        for key in keys {
            inner.expire(&key, now);
        }
        inner.entries.len()
    }

    /// Returns `true` if the store holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries.
    pub fn clear(&self) {
        let mut inner = self.inner.write().expect("lock poisoned");
        let keys: Vec<String> = inner.entries.keys().cloned().collect();
        for key in &keys {
            inner.bump(key);
        }
        inner.entries.clear();
    }

    /// Remaining TTL of a live key, or `None` if absent/expired.
    pub fn remaining_ttl(&self, key: &str) -> Option<Duration> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(key, now);
        inner.entries.get(key).map(|e| e.expires_at - now)
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(key, now);
        Ok(inner.entries.get(key).map(|e| e.value.clone()))
    }

    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: now + ttl,
            },
        );
        inner.bump(key);
        Ok(())
    }

    fn rename_if_vacant(&self, src: &str, dst: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(src, now);
        inner.expire(dst, now);

        if !inner.entries.contains_key(src) {
            return Err(StoreError::NoSuchKey {
                key: src.to_string(),
            });
        }
        if inner.entries.contains_key(dst) {
            // Destination occupied: no-op, source stays put.
            return Ok(false);
        }
        if let Some(entry) = inner.entries.remove(src) {
            inner.entries.insert(dst.to_string(), entry);
            inner.bump(src);
            inner.bump(dst);
        }
        Ok(true)
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(key, now);
        let existed = inner.entries.remove(key).is_some();
        if existed {
            inner.bump(key);
        }
        Ok(existed)
    }

    fn watch_get(&self, key: &str) -> StoreResult<WatchedValue> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(key, now);
        Ok(WatchedValue {
            value: inner.entries.get(key).map(|e| e.value.clone()),
            token: WatchToken::new(inner.stamp_of(key)),
        })
    }

    fn commit_delete(&self, key: &str, token: WatchToken) -> StoreResult<TxnOutcome> {
        let mut inner = self.inner.write().expect("lock poisoned");
        let now = self.now(&inner);
        inner.expire(key, now);
        if inner.stamp_of(key) != token.stamp() {
            return Ok(TxnOutcome::Conflict);
        }
        if inner.entries.remove(key).is_some() {
            inner.bump(key);
        }
        Ok(TxnOutcome::Committed)
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.inner.read().expect("lock poisoned").entries.len();
        f.debug_struct("InMemoryKvStore")
            .field("entry_count", &count)
            .finish()
    }
}
