//! The keyfence locking protocol.
//!
//! This crate implements the acquisition-and-release protocol against a
//! [`keyfence_store::KvStore`]: how ownership is staged and committed
//! atomically, how it is verified and relinquished safely under concurrent
//! access and partial failure, and how batches of keys are acquired and
//! released without false atomicity guarantees.
//!
//! # Architecture
//!
//! - **Acquisition** stages the sealed ownership record under a private,
//!   attempt-scoped key and atomically renames it onto the canonical key,
//!   conditioned on the canonical key being vacant. The rename is the sole
//!   arbitration point: exactly one concurrent attempt per key can win.
//!   A losing attempt's staging key self-expires unread.
//! - **Release** is an optimistic compare-and-delete: watched read, decode,
//!   lease-id comparison, conditional commit; a store-reported conflict
//!   restarts the sequence with a fresh read. Only a matching lease id is
//!   ever deleted.
//! - **Batches** pipeline all per-key command pairs into one round trip and
//!   report each key's outcome independently. Partial success is the
//!   contract; nothing is rolled back on a partly failed batch.
//!
//! The protocol is stateless between calls; all mutual exclusion comes
//! from the store's atomic primitives. There is no lease renewal: a
//! critical section that outlives its TTL silently loses ownership.
//!
//! # Modules
//!
//! - [`error`] — The unified [`LockError`] taxonomy
//! - [`engine`] — [`LockEngine`]: the protocol core
//! - [`handle`] — [`LeaseHandle`]: live ownership handles and scoped
//!   release

pub mod engine;
pub mod error;
pub mod handle;

pub use engine::{LockEngine, MacquireOutcome, MreleaseOutcome};
pub use error::{LockError, LockResult};
pub use handle::{LeaseHandle, ReleaseMode, ScopedError};
