//! High-level API for keyfence.
//!
//! Provides the settings-bound [`Lock`] facade and the [`LockFactory`]
//! that binds lock namespaces to store connections. This is the main
//! entry point for applications embedding keyfence.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use keyfence_sdk::{InMemoryKvStore, Lock, ReleaseMode};
//!
//! let store = Arc::new(InMemoryKvStore::new());
//! let lock = Lock::create("orders", Duration::from_secs(30), 1, store);
//!
//! let handle = lock.acquire(&["order-17"]).unwrap();
//! handle
//!     .scoped(ReleaseMode::Strict, |h| {
//!         // exclusive section for order-17
//!         h.check_owned()
//!     })
//!     .unwrap();
//! ```

pub mod facade;
pub mod factory;

pub use facade::{BatchAcquired, BatchReleased, Lock};
pub use factory::LockFactory;

// Re-export key types
pub use keyfence_lock::{
    LeaseHandle, LockEngine, LockError, LockResult, MacquireOutcome, MreleaseOutcome,
    ReleaseMode, ScopedError,
};
pub use keyfence_store::{InMemoryKvStore, KvStore, StoreError, StoreResult};
pub use keyfence_types::{
    ArityError, EnvelopeError, KeyFormatter, LeaseId, LeaseRecord, LockRequest, LockSettings,
    Timestamp, DEFAULT_ROOT_PREFIX,
};
