//! Foundation types for keyfence.
//!
//! This crate provides the value types shared by every keyfence crate: lease
//! identity, wall-clock timestamps, canonical key construction, lock
//! descriptors, ownership records, and the envelope format that records are
//! persisted in.
//!
//! # Key Types
//!
//! - [`LeaseId`] — Unique acquisition token (UUID v7); the sole fencing
//!   mechanism distinguishing one ownership of a key from any other
//! - [`Timestamp`] — Wall-clock milliseconds since the UNIX epoch
//! - [`KeyFormatter`] — Arity-checked canonical key construction
//! - [`LockSettings`] — Per-namespace lock configuration
//! - [`LockRequest`] — Immutable descriptor of one intended lock
//! - [`LeaseRecord`] — The ownership record written into the store
//!
//! # Modules
//!
//! - [`error`] — Pre-I/O error types ([`ArityError`], [`EnvelopeError`])
//! - [`envelope`] — Versioned, kind-tagged record encoding
//! - [`key`] — Canonical key formatting
//! - [`lease`] — Lease identity and ownership records
//! - [`request`] — Lock descriptors
//! - [`settings`] — Lock namespace configuration
//! - [`temporal`] — Wall-clock timestamps

pub mod envelope;
pub mod error;
pub mod key;
pub mod lease;
pub mod request;
pub mod settings;
pub mod temporal;

pub use envelope::{RecordKind, ENVELOPE_VERSION};
pub use error::{ArityError, EnvelopeError};
pub use key::{KeyFormatter, DEFAULT_ROOT_PREFIX, KEY_SEPARATOR};
pub use lease::{LeaseId, LeaseRecord};
pub use request::LockRequest;
pub use settings::LockSettings;
pub use temporal::Timestamp;
