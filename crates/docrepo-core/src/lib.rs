//! Core runtime for docrepo: criteria trees, the derived-query descriptor
//! parser, query rendering, and continuation-token pagination.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod cursor;
pub mod error;
pub mod model;
pub mod obs;
pub mod query;
pub mod repository;
pub mod serialize;
pub mod value;

///
/// CONSTANTS
///

/// Upper bound on encoded page-request payloads accepted from callers.
///
/// Continuation tokens are store-defined and usually small; anything larger
/// than this is treated as hostile input rather than a cursor.
pub const MAX_PAGE_REQUEST_BYTES: usize = 16 * 1024;

/// Page size used when a query runs without an explicit page request.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

///
/// Prelude
///
/// Prelude contains only query vocabulary.
/// No executors, registries, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        cursor::{ContinuationToken, Page, PageRequest},
        model::{EntitySchema, PropertyPath, PropertyResolver},
        query::{
            ArgShape, Criteria, CriteriaKind, Direction, SortSpec, builder::field,
            derived::{Arg, DerivedQuery},
        },
        value::{GeoPoint, Value},
    };
}
