//! Versioned, kind-tagged encoding for persisted records.
//!
//! Every value this library writes into the store is wrapped in an
//! [`Envelope`]: a format version, a record-kind tag, and the serialized
//! payload. Decoding verifies the kind tag and version *before* touching
//! any payload field, so a structurally similar but differently-typed
//! payload fails loudly instead of producing a wrong-shaped record.
//!
//! Kind tags are stable `u8` values rather than raw enum discriminants, so
//! the wire format does not depend on variant declaration order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::EnvelopeError;

/// Current envelope format version.
pub const ENVELOPE_VERSION: u16 = 1;

/// The kind of record an envelope carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// An ownership record ([`crate::LeaseRecord`]).
    Lease,
}

impl RecordKind {
    /// Stable on-wire tag for this kind.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Lease => 1,
        }
    }

    /// Parse an on-wire tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Lease),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lease => write!(f, "lease"),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u16,
    kind: u8,
    payload: Vec<u8>,
}

/// Encode `value` into an envelope of the given kind.
pub fn seal<T: Serialize>(kind: RecordKind, value: &T) -> Result<Vec<u8>, EnvelopeError> {
    let payload =
        bincode::serialize(value).map_err(|e| EnvelopeError::Encode(e.to_string()))?;
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        kind: kind.tag(),
        payload,
    };
    bincode::serialize(&envelope).map_err(|e| EnvelopeError::Encode(e.to_string()))
}

/// Decode an envelope of the expected kind.
///
/// Verification order: well-formed envelope, then version, then kind tag,
/// then the payload itself. Each failure is a distinct [`EnvelopeError`].
pub fn open<T: DeserializeOwned>(
    expected: RecordKind,
    bytes: &[u8],
) -> Result<T, EnvelopeError> {
    let envelope: Envelope =
        bincode::deserialize(bytes).map_err(|e| EnvelopeError::Decode(e.to_string()))?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(EnvelopeError::UnsupportedVersion {
            got: envelope.version,
            current: ENVELOPE_VERSION,
        });
    }
    match RecordKind::from_tag(envelope.kind) {
        Some(kind) if kind == expected => {}
        _ => {
            return Err(EnvelopeError::KindMismatch {
                expected,
                got: envelope.kind,
            });
        }
    }
    bincode::deserialize(&envelope.payload).map_err(|e| EnvelopeError::Decode(e.to_string()))
}
