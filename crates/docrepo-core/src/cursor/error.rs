use crate::cursor::codec::CursorDecodeError;
use thiserror::Error as ThisError;

///
/// TokenWireError
/// Page-request wire encode/decode failures.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TokenWireError {
    #[error("failed to encode page request: {0}")]
    Encode(String),

    #[error("failed to decode page request: {0}")]
    Decode(String),

    #[error("unsupported page request version: {version}")]
    UnsupportedVersion { version: u8 },

    #[error("page request sorts by malformed property path '{path}'")]
    InvalidSortKey { path: String },
}

impl TokenWireError {
    pub(super) fn encode(reason: impl Into<String>) -> Self {
        Self::Encode(reason.into())
    }

    pub(super) fn decode(reason: impl Into<String>) -> Self {
        Self::Decode(reason.into())
    }

    pub(super) const fn unsupported_version(version: u8) -> Self {
        Self::UnsupportedVersion { version }
    }

    pub(super) fn invalid_sort_key(path: impl Into<String>) -> Self {
        Self::InvalidSortKey { path: path.into() }
    }
}

///
/// PageRequestError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PageRequestError {
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    #[error("page size {size} exceeds the configured maximum of {max}")]
    PageSizeExceeded { size: u32, max: u32 },
}

///
/// CursorError
///
/// Everything that can go wrong turning transport input into a page request.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorError {
    #[error(transparent)]
    Decode(#[from] CursorDecodeError),

    #[error(transparent)]
    Wire(#[from] TokenWireError),

    #[error(transparent)]
    Page(#[from] PageRequestError),
}
