//! Error types raised before any store I/O takes place.

use thiserror::Error;

use crate::envelope::RecordKind;

/// A key formatter was given the wrong number of arguments.
///
/// Always a programmer or configuration bug: the argument count is fixed
/// when the lock namespace is configured, so this never depends on runtime
/// state and is never worth retrying. Raised before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} key arguments; got {got}")]
pub struct ArityError {
    /// The arity the formatter was configured with.
    pub expected: usize,
    /// The number of arguments actually supplied.
    pub got: usize,
}

/// A persisted record failed envelope verification.
///
/// Indicates store corruption or a cross-version/cross-schema collision:
/// some other writer put a structurally similar but differently-typed
/// payload under a key this library owns. Never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The payload's kind tag does not match the expected record kind.
    #[error("record kind mismatch: expected {expected}, got tag {got}")]
    KindMismatch { expected: RecordKind, got: u8 },

    /// The envelope was written by an unsupported format version.
    #[error("unsupported envelope version {got} (current is {current})")]
    UnsupportedVersion { got: u16, current: u16 },

    /// The bytes are not a well-formed envelope or payload.
    #[error("malformed envelope: {0}")]
    Decode(String),

    /// The record could not be encoded.
    #[error("failed to encode record: {0}")]
    Encode(String),
}
