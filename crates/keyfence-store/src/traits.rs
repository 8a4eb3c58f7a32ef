//! The [`KvStore`] trait defining the backing-store interface.
//!
//! Any backend (in-memory, Redis-like server, embedded store) implements
//! this trait to back the locking protocol. Implementations must be
//! thread-safe (`Send + Sync`); all mutual exclusion the protocol provides
//! is enforced by these primitives, never by in-process locking.

use std::time::Duration;

use crate::error::StoreResult;

/// Opaque fencing stamp from a watched read.
///
/// A token is only meaningful when passed back to the store that issued
/// it, for the key it was issued for. The store refuses a commit when the
/// key was modified after the token was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchToken(u64);

impl WatchToken {
    /// Wrap a backend's modification stamp.
    pub fn new(stamp: u64) -> Self {
        Self(stamp)
    }

    /// The backend's modification stamp.
    pub fn stamp(&self) -> u64 {
        self.0
    }
}

/// A value read under watch: the bytes (or absence) plus the fencing
/// stamp for a subsequent conditional commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedValue {
    /// The key's current value, or `None` if absent.
    pub value: Option<Vec<u8>>,
    /// Stamp fencing any commit conditioned on this read.
    pub token: WatchToken,
}

/// Outcome of a conditional commit.
///
/// `Conflict` is distinct from a committed no-op: a commit that found
/// nothing to delete but raced no writer still reports `Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnOutcome {
    /// The commit was applied (possibly as a no-op).
    Committed,
    /// A watched key was modified after the read; nothing was applied.
    Conflict,
}

/// One command in a pipelined batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvCommand {
    /// Read a key's value.
    Get { key: String },
    /// Atomically write a value with an expiry.
    SetWithTtl {
        key: String,
        value: Vec<u8>,
        ttl: Duration,
    },
    /// Atomically rename `src` onto `dst` iff `dst` is vacant, preserving
    /// the source's remaining TTL.
    RenameIfVacant { src: String, dst: String },
    /// Unconditionally delete a key.
    Delete { key: String },
}

/// Per-command reply, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvReply {
    /// Reply to [`KvCommand::Get`].
    Value(Option<Vec<u8>>),
    /// Reply to [`KvCommand::SetWithTtl`].
    Set,
    /// Reply to [`KvCommand::RenameIfVacant`]: whether the rename won.
    Renamed(bool),
    /// Reply to [`KvCommand::Delete`]: whether the key existed.
    Deleted(bool),
}

/// Key-value store with atomic per-key operations and TTL expiry.
///
/// Implementations must guarantee:
/// - Every method is atomic with respect to its key(s); concurrent callers
///   observe each operation entirely or not at all.
/// - [`rename_if_vacant`](KvStore::rename_if_vacant) succeeds for exactly
///   one of any set of concurrent renames onto the same vacant key, and
///   preserves the source's remaining TTL.
/// - [`commit_delete`](KvStore::commit_delete) refuses the commit when the
///   key was modified after the corresponding
///   [`watch_get`](KvStore::watch_get), reporting [`TxnOutcome::Conflict`];
///   the commit itself is atomic even when the caller is cancelled before
///   its next call.
/// - Expired keys behave as absent everywhere.
pub trait KvStore: Send + Sync {
    /// Read a key's value. Returns `Ok(None)` if the key is absent or
    /// expired.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Atomically write `value` under `key` with expiry `ttl`.
    fn set_with_ttl(&self, key: &str, value: &[u8], ttl: Duration) -> StoreResult<()>;

    /// Atomically rename `src` onto `dst` iff `dst` is vacant.
    ///
    /// Returns `true` when the rename won, `false` (leaving `src` in
    /// place) when `dst` already holds a value. The source's remaining TTL
    /// moves with it. Fails with [`crate::StoreError::NoSuchKey`] when
    /// `src` is absent.
    fn rename_if_vacant(&self, src: &str, dst: &str) -> StoreResult<bool>;

    /// Unconditionally delete `key`. Returns whether it existed.
    fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Snapshot-read `key` under watch, returning its value and a fencing
    /// stamp for a subsequent [`commit_delete`](KvStore::commit_delete).
    fn watch_get(&self, key: &str) -> StoreResult<WatchedValue>;

    /// Delete `key` iff it is unmodified since the watched read that
    /// issued `token`.
    fn commit_delete(&self, key: &str, token: WatchToken) -> StoreResult<TxnOutcome>;

    /// Execute one command via the primitive methods.
    fn execute(&self, command: &KvCommand) -> StoreResult<KvReply> {
        match command {
            KvCommand::Get { key } => self.get(key).map(KvReply::Value),
            KvCommand::SetWithTtl { key, value, ttl } => {
                self.set_with_ttl(key, value, *ttl).map(|()| KvReply::Set)
            }
            KvCommand::RenameIfVacant { src, dst } => {
                self.rename_if_vacant(src, dst).map(KvReply::Renamed)
            }
            KvCommand::Delete { key } => self.delete(key).map(KvReply::Deleted),
        }
    }

    /// Execute a batch of independent commands, returning replies in issue
    /// order.
    ///
    /// Default implementation executes sequentially. Networked backends
    /// should override to coalesce the batch into one round trip. Each
    /// command's outcome is independent; no cross-key atomicity is
    /// implied or permitted to be assumed.
    fn pipeline(&self, commands: &[KvCommand]) -> StoreResult<Vec<KvReply>> {
        commands.iter().map(|cmd| self.execute(cmd)).collect()
    }
}
