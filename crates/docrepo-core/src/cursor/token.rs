use crate::cursor::codec::encode_hex;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// ContinuationToken
///
/// Store-issued opaque cursor bytes. Never interpreted by the engine; two
/// tokens are the same cursor position iff their bytes are equal.
///
/// An empty token does not exist: an empty payload means "no further page"
/// and is represented as `None` wherever a token is optional.
///

#[derive(Clone, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct ContinuationToken(#[serde(with = "serde_bytes")] Vec<u8>);

impl ContinuationToken {
    /// Wrap store bytes; `None` for an empty payload.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Option<Self> {
        let bytes = bytes.into();

        (!bytes.is_empty()).then_some(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContinuationToken({})", encode_hex(&self.0))
    }
}

impl AsRef<[u8]> for ContinuationToken {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

///
/// TESTS
///
