//! Generic CBOR serialization.
//!
//! Format-level only: callers that decode untrusted input pass an explicit
//! size limit.

use serde::{Serialize, de::DeserializeOwned};
use serde_cbor::{from_slice, to_vec};
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
};
use thiserror::Error as ThisError;

///
/// SerializeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },
}

impl SerializeError {
    /// Stable error kind independent of backend message text.
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Serialize(_) => SerializeErrorKind::Serialize,
            Self::Deserialize(_) => SerializeErrorKind::Deserialize,
            Self::DeserializeSizeLimitExceeded { .. } => {
                SerializeErrorKind::DeserializeSizeLimitExceeded
            }
        }
    }
}

///
/// SerializeErrorKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Serialize,
    Deserialize,
    DeserializeSizeLimitExceeded,
}

impl SerializeErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
            Self::DeserializeSizeLimitExceeded => "deserialize_size_limit_exceeded",
        }
    }
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialize a value into CBOR bytes.
pub fn serialize<T>(value: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))
}

/// Deserialize at most `max_bytes` of CBOR.
///
/// The input size is checked before decoding, and a panic inside the decoder
/// is reported as a deserialize error rather than unwinding into the caller.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    if bytes.len() > max_bytes {
        return Err(SerializeError::DeserializeSizeLimitExceeded {
            len: bytes.len(),
            max_bytes,
        });
    }

    match catch_unwind(AssertUnwindSafe(|| from_slice(bytes))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SerializeError::Deserialize(err.to_string())),
        Err(_) => Err(SerializeError::Deserialize(
            "panic during CBOR deserialization".into(),
        )),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_payload_is_rejected_before_decode() {
        let bytes = serialize(&vec![0u8; 64]).expect("serialize should succeed");

        let err = deserialize_bounded::<Vec<u8>>(&bytes, 8).expect_err("limit should apply");

        assert_eq!(err.kind(), SerializeErrorKind::DeserializeSizeLimitExceeded);
    }

    #[test]
    fn malformed_payload_reports_deserialize_kind() {
        let err = deserialize_bounded::<String>(&[0xff, 0x00, 0x13], 1024)
            .expect_err("garbage should fail");

        assert_eq!(err.kind(), SerializeErrorKind::Deserialize);
        assert_eq!(err.kind().to_string(), "deserialize");
    }
}
