//! Backing-store boundary for keyfence.
//!
//! The locking protocol runs against a shared, network-accessible
//! key-value store with atomic per-key operations and TTL expiry. This
//! crate specifies that store at its interface, [`KvStore`], and ships an
//! in-memory backend for tests and embedding. The store never interprets
//! the values it holds; they are opaque bytes to it.
//!
//! # Architecture
//!
//! - **Atomic per-key primitives**: set-with-expiry, rename-if-vacant
//!   (TTL-preserving), get, delete. Rename-if-vacant is the arbitration
//!   primitive: exactly one concurrent rename onto a vacant key succeeds.
//! - **Optimistic concurrency**: [`KvStore::watch_get`] returns a fencing
//!   stamp alongside the value; [`KvStore::commit_delete`] commits only if
//!   the key is unmodified since that read, reporting a conflict
//!   distinctly from a committed no-op.
//! - **Pipelining**: [`KvStore::pipeline`] batches independent commands
//!   into what a networked backend coalesces into one round trip. No
//!   cross-key atomicity is implied; each command's outcome is
//!   independent.
//!
//! # Modules
//!
//! - [`error`] — Store error types
//! - [`traits`] — The [`KvStore`] trait and the pipeline command set
//! - [`memory`] — In-memory [`InMemoryKvStore`] for tests

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryKvStore;
pub use traits::{KvCommand, KvReply, KvStore, TxnOutcome, WatchToken, WatchedValue};
