//! Module: cursor
//! Responsibility: pagination state and its transport encodings.
//! Does not own: fetching, or interpreting store continuation bytes.
//! Boundary: the executor consumes a `PageRequest` and hands back the next
//! token; nothing here mutates a published request.

pub mod codec;
mod error;
mod page;
mod token;
mod wire;


pub use codec::CursorDecodeError;
pub use error::{CursorError, PageRequestError, TokenWireError};
pub use page::{Page, PageRequest};
pub use token::ContinuationToken;
