use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// Immutable descriptor of one intended lock.
///
/// Created per call by [`crate::LockSettings::make_request`], consumed by
/// the engine, and discarded after use. The prefix, arity, and TTL fields
/// are provenance metadata: two requests are equal iff their keys are
/// equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRequest {
    /// The canonical store key this request contends for.
    pub key: String,
    /// When the request was made.
    pub requested_at: Timestamp,
    /// How long the acquired lock lives before the store expires it.
    pub ttl: Duration,
    /// The arity of the namespace that produced the key.
    pub arity: usize,
    /// The namespace prefix that produced the key.
    pub prefix: String,
    /// The root prefix that produced the key.
    pub root_prefix: String,
}

impl PartialEq for LockRequest {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for LockRequest {}

impl Hash for LockRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
