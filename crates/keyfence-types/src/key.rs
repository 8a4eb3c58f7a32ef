//! Canonical key construction.
//!
//! Locks are identified by structured string keys built from a prefix
//! hierarchy and an ordered argument tuple:
//!
//! ```text
//! root_prefix : prefix : arg1 : arg2 : ... : argN
//! ```
//!
//! where `N` is the formatter's configured arity. The separator is a
//! fixed `:`. Arguments must not contain it, or two distinct tuples
//! could collide on one key. Key construction is pure and performs no store
//! access; an arity violation fails before any I/O happens.

use crate::error::ArityError;

/// Root prefix used when none is configured explicitly.
pub const DEFAULT_ROOT_PREFIX: &str = "keyfence";

/// The fixed separator joining key segments. Reserved: argument strings
/// must not contain it.
pub const KEY_SEPARATOR: char = ':';

/// Builds canonical, arity-checked keys for one lock namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFormatter {
    prefix: String,
    arity: usize,
    root_prefix: String,
}

impl KeyFormatter {
    /// Create a formatter under [`DEFAULT_ROOT_PREFIX`].
    ///
    /// `arity` is the exact number of arguments every key takes; it must be
    /// at least 1.
    pub fn new(prefix: impl Into<String>, arity: usize) -> Self {
        Self::with_root_prefix(prefix, arity, DEFAULT_ROOT_PREFIX)
    }

    /// Create a formatter under an explicit root prefix.
    pub fn with_root_prefix(
        prefix: impl Into<String>,
        arity: usize,
        root_prefix: impl Into<String>,
    ) -> Self {
        debug_assert!(arity >= 1, "lock arity must be at least 1");
        Self {
            prefix: prefix.into(),
            arity,
            root_prefix: root_prefix.into(),
        }
    }

    /// The namespace prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The exact number of arguments every key takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The root prefix.
    pub fn root_prefix(&self) -> &str {
        &self.root_prefix
    }

    /// Build the canonical key for `args`.
    ///
    /// Fails with [`ArityError`] when `args.len() != arity`. Pure and
    /// deterministic; never touches the store.
    pub fn format<S: AsRef<str>>(&self, args: &[S]) -> Result<String, ArityError> {
        if args.len() != self.arity {
            return Err(ArityError {
                expected: self.arity,
                got: args.len(),
            });
        }
        let mut key = String::with_capacity(
            self.root_prefix.len()
                + self.prefix.len()
                + args.iter().map(|a| a.as_ref().len() + 1).sum::<usize>()
                + 1,
        );
        key.push_str(&self.root_prefix);
        key.push(KEY_SEPARATOR);
        key.push_str(&self.prefix);
        for arg in args {
            key.push(KEY_SEPARATOR);
            key.push_str(arg.as_ref());
        }
        Ok(key)
    }
}
