//! Lease identity and ownership records.
//!
//! A [`LeaseId`] names one specific acquisition of one key. It is generated
//! fresh for every attempt, never reused and never derived from the key,
//! so it distinguishes "my ownership" from any other party's ownership of
//! the same key, including a past ownership by the same caller. It is the sole
//! fencing token this library provides.
//!
//! A [`LeaseRecord`] is what a successful acquisition writes into the
//! store: the request it answers, the lease id, and the acquisition time.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::envelope::{self, RecordKind};
use crate::error::EnvelopeError;
use crate::request::LockRequest;
use crate::temporal::Timestamp;

/// Unique identifier for one acquisition (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseId(uuid::Uuid);

impl LeaseId {
    /// Generate a fresh, never-before-used lease id.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for LeaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for LeaseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeaseId({})", self.short_id())
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ownership record written into the store on acquisition.
///
/// Constructed in memory before any store write; sealed into the store's
/// value on success; read back and opened on every ownership check or
/// release. The in-store copy is destroyed by explicit release or TTL
/// expiry. Identity is `(key, id)`: the acquisition timestamp is
/// provenance, not identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaseRecord {
    /// The request this record answers.
    pub request: LockRequest,
    /// The acquisition's fencing token.
    pub id: LeaseId,
    /// When the acquisition was made.
    pub acquired_at: Timestamp,
}

impl LeaseRecord {
    /// Assemble a record for an acquisition attempt.
    pub fn new(request: LockRequest, id: LeaseId, acquired_at: Timestamp) -> Self {
        Self {
            request,
            id,
            acquired_at,
        }
    }

    /// The canonical key this record contends for.
    pub fn key(&self) -> &str {
        &self.request.key
    }

    /// The private, attempt-scoped key this record is staged under before
    /// being renamed onto the canonical key.
    ///
    /// Derived deterministically from the canonical key and the lease id,
    /// so concurrent attempts on the same key never collide on a staging
    /// key either.
    pub fn staging_key(&self) -> String {
        format!("{}-{}", self.request.key, self.id)
    }

    /// Encode this record into its persisted envelope.
    pub fn seal(&self) -> Result<Vec<u8>, EnvelopeError> {
        envelope::seal(RecordKind::Lease, self)
    }

    /// Decode a persisted envelope, verifying kind and version first.
    pub fn open(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        envelope::open(RecordKind::Lease, bytes)
    }
}

impl PartialEq for LeaseRecord {
    fn eq(&self, other: &Self) -> bool {
        self.request.key == other.request.key && self.id == other.id
    }
}

impl Eq for LeaseRecord {}

impl Hash for LeaseRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.request.key.hash(state);
        self.id.hash(state);
    }
}
