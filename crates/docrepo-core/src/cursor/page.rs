use crate::{
    cursor::{
        ContinuationToken, CursorError, PageRequestError, TokenWireError,
        codec::{decode_hex, encode_hex},
        wire::{PageRequestVersion, PageRequestWire},
    },
    query::sort::SortSpec,
};
use std::hash::{Hash, Hasher};

///
/// PageRequest
///
/// Immutable pagination state for one fetch.
///
/// Identity is `(page_size, continuation, sort)`. `page_index` is display
/// metadata only: the store's real position lives in the continuation
/// token, so two requests with equal tokens are the same cursor position
/// whatever their index says.
///

#[derive(Clone, Debug)]
pub struct PageRequest {
    page_index: u32,
    page_size: u32,
    continuation: Option<ContinuationToken>,
    sort: SortSpec,
}

impl PageRequest {
    /// Build a request; `page_size` must be positive.
    pub const fn new(page_index: u32, page_size: u32) -> Result<Self, PageRequestError> {
        if page_size == 0 {
            return Err(PageRequestError::ZeroPageSize);
        }

        Ok(Self {
            page_index,
            page_size,
            continuation: None,
            sort: SortSpec::unsorted(),
        })
    }

    /// First page of `page_size` rows.
    pub const fn first(page_size: u32) -> Result<Self, PageRequestError> {
        Self::new(0, page_size)
    }

    #[must_use]
    pub fn with_continuation(mut self, continuation: Option<ContinuationToken>) -> Self {
        self.continuation = continuation;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn page_index(&self) -> u32 {
        self.page_index
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub const fn continuation(&self) -> Option<&ContinuationToken> {
        self.continuation.as_ref()
    }

    #[must_use]
    pub const fn sort(&self) -> &SortSpec {
        &self.sort
    }

    /// Reject sizes above a configured cap.
    pub const fn check_max_size(&self, max: u32) -> Result<(), PageRequestError> {
        if self.page_size > max {
            return Err(PageRequestError::PageSizeExceeded {
                size: self.page_size,
                max,
            });
        }

        Ok(())
    }

    /// Request for the page after this one, or `None` when the store returned
    /// no continuation (this was the last page).
    #[must_use]
    pub fn next(&self, continuation: Option<ContinuationToken>) -> Option<Self> {
        continuation.map(|token| Self {
            page_index: self.page_index.saturating_add(1),
            page_size: self.page_size,
            continuation: Some(token),
            sort: self.sort.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Encode as a versioned CBOR payload.
    pub fn encode(&self) -> Result<Vec<u8>, TokenWireError> {
        PageRequestWire::from_request(self, PageRequestVersion::CURRENT).encode()
    }

    /// Decode a payload of at most `max_bytes`.
    pub fn decode(bytes: &[u8], max_bytes: usize) -> Result<Self, CursorError> {
        let wire = PageRequestWire::decode(bytes, max_bytes)?;
        let continuation = wire.continuation_token();

        Ok(Self::new(wire.page_index, wire.page_size)?
            .with_continuation(continuation)
            .with_sort(wire.sort))
    }

    /// Encode as a lowercase hex cursor string.
    pub fn to_cursor_string(&self) -> Result<String, TokenWireError> {
        self.encode().map(|bytes| encode_hex(&bytes))
    }

    /// Decode a hex cursor string carrying at most `max_bytes` of payload.
    pub fn from_cursor_string(cursor: &str, max_bytes: usize) -> Result<Self, CursorError> {
        let bytes = decode_hex(cursor, max_bytes)?;

        Self::decode(&bytes, max_bytes)
    }

    #[cfg(test)]
    pub(crate) fn encode_with_version_for_test(&self, version: u8) -> Result<Vec<u8>, TokenWireError> {
        let mut wire = PageRequestWire::from_request(self, PageRequestVersion::CURRENT);
        wire.version = version;
        wire.encode()
    }
}

impl PartialEq for PageRequest {
    fn eq(&self, other: &Self) -> bool {
        self.page_size == other.page_size
            && self.continuation == other.continuation
            && self.sort == other.sort
    }
}

impl Eq for PageRequest {}

impl Hash for PageRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.page_size.hash(state);
        self.continuation.hash(state);
        self.sort.hash(state);
    }
}

///
/// Page
///
/// One fetched page plus the request that produced it.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    request: PageRequest,
    next_continuation: Option<ContinuationToken>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(
        items: Vec<T>,
        request: PageRequest,
        next_continuation: Option<ContinuationToken>,
    ) -> Self {
        Self {
            items,
            request,
            next_continuation,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn request(&self) -> &PageRequest {
        &self.request
    }

    #[must_use]
    pub const fn next_continuation(&self) -> Option<&ContinuationToken> {
        self.next_continuation.as_ref()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True iff the store returned no continuation.
    #[must_use]
    pub const fn is_last_page(&self) -> bool {
        self.next_continuation.is_none()
    }

    /// Request for the following page; `None` on the last page.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        self.request.next(self.next_continuation.clone())
    }
}
