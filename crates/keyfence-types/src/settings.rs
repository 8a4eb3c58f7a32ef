use std::time::Duration;

use crate::error::ArityError;
use crate::key::{KeyFormatter, DEFAULT_ROOT_PREFIX};
use crate::request::LockRequest;
use crate::temporal::Timestamp;

/// Configuration for one logical lock namespace.
///
/// Created once per namespace and shared by every request made against it.
/// A settings value fixes the key layout (prefix, arity, root prefix) and
/// the TTL every acquisition under it receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockSettings {
    /// Namespace prefix embedded in every key.
    pub prefix: String,
    /// Lifetime of each acquired lock before the store expires it.
    pub ttl: Duration,
    /// Exact number of arguments composing a key.
    pub arity: usize,
    /// Root prefix embedded in every key.
    pub root_prefix: String,
}

impl LockSettings {
    /// Create settings under [`DEFAULT_ROOT_PREFIX`].
    pub fn new(prefix: impl Into<String>, ttl: Duration, arity: usize) -> Self {
        Self::with_root_prefix(prefix, ttl, arity, DEFAULT_ROOT_PREFIX)
    }

    /// Create settings under an explicit root prefix.
    pub fn with_root_prefix(
        prefix: impl Into<String>,
        ttl: Duration,
        arity: usize,
        root_prefix: impl Into<String>,
    ) -> Self {
        debug_assert!(arity >= 1, "lock arity must be at least 1");
        Self {
            prefix: prefix.into(),
            ttl,
            arity,
            root_prefix: root_prefix.into(),
        }
    }

    /// The key formatter these settings imply.
    pub fn formatter(&self) -> KeyFormatter {
        KeyFormatter::with_root_prefix(self.prefix.clone(), self.arity, self.root_prefix.clone())
    }

    /// Resolve `args` into a request stamped with the current time.
    pub fn make_request<S: AsRef<str>>(&self, args: &[S]) -> Result<LockRequest, ArityError> {
        self.make_request_at(args, Timestamp::now())
    }

    /// Resolve `args` into a request stamped with a supplied time.
    ///
    /// Batch callers pass one shared `now` so every descriptor in the batch
    /// carries an identical request timestamp.
    pub fn make_request_at<S: AsRef<str>>(
        &self,
        args: &[S],
        now: Timestamp,
    ) -> Result<LockRequest, ArityError> {
        let key = self.formatter().format(args)?;
        Ok(LockRequest {
            key,
            requested_at: now,
            ttl: self.ttl,
            arity: self.arity,
            prefix: self.prefix.clone(),
            root_prefix: self.root_prefix.clone(),
        })
    }
}
