use crate::{
    cursor::{ContinuationToken, PageRequest, TokenWireError},
    query::sort::SortSpec,
    serialize::{deserialize_bounded, serialize},
};
use serde::{Deserialize, Serialize};
use serde_bytes::ByteBuf;

///
/// PageRequestVersion
///
/// Wire-level version of an encoded page request. Version parsing and
/// compatibility rules live here only.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum PageRequestVersion {
    V1,
}

impl PageRequestVersion {
    const V1_TAG: u8 = 1;

    pub(super) const CURRENT: Self = Self::V1;

    pub(super) const fn decode(raw: u8) -> Option<Self> {
        match raw {
            Self::V1_TAG => Some(Self::V1),
            _ => None,
        }
    }

    pub(super) const fn encode(self) -> u8 {
        match self {
            Self::V1 => Self::V1_TAG,
        }
    }
}

///
/// PageRequestWire
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub(super) struct PageRequestWire {
    pub(super) version: u8,
    pub(super) page_index: u32,
    pub(super) page_size: u32,
    #[serde(default)]
    pub(super) continuation: Option<ByteBuf>,
    #[serde(default)]
    pub(super) sort: SortSpec,
}

impl PageRequestWire {
    pub(super) fn from_request(request: &PageRequest, version: PageRequestVersion) -> Self {
        Self {
            version: version.encode(),
            page_index: request.page_index(),
            page_size: request.page_size(),
            continuation: request
                .continuation()
                .map(|token| ByteBuf::from(token.as_bytes().to_vec())),
            sort: request.sort().clone(),
        }
    }

    pub(super) fn encode(&self) -> Result<Vec<u8>, TokenWireError> {
        serialize(self).map_err(|err| TokenWireError::encode(err.to_string()))
    }

    // Decode and check the version; page-size validation is the caller's.
    pub(super) fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self, TokenWireError> {
        let wire: Self = deserialize_bounded(bytes, max_bytes)
            .map_err(|err| TokenWireError::decode(err.to_string()))?;

        PageRequestVersion::decode(wire.version)
            .ok_or_else(|| TokenWireError::unsupported_version(wire.version))?;

        // Sort keys end up in query text; the payload is client-supplied.
        if let Some(key) = wire
            .sort
            .keys()
            .iter()
            .find(|key| !key.property.is_well_formed())
        {
            return Err(TokenWireError::invalid_sort_key(key.property.as_str()));
        }

        Ok(wire)
    }

    pub(super) fn continuation_token(&self) -> Option<ContinuationToken> {
        self.continuation
            .as_ref()
            .and_then(|bytes| ContinuationToken::from_bytes(bytes.to_vec()))
    }
}
