use derive_more::Display;
use docrepo_config::ConfigError;
use docrepo_core::error::{ErrorClass, QueryError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True when the query declaration itself is at fault.
    #[must_use]
    pub const fn is_declaration_defect(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Query(
                QueryErrorKind::MalformedDescriptor
                    | QueryErrorKind::UnknownProperty
                    | QueryErrorKind::UnsupportedNegation
                    | QueryErrorKind::UnsupportedOperatorCombination
            )
        )
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let origin = match &err {
            QueryError::Descriptor(_) | QueryError::Bind(_) => ErrorOrigin::Descriptor,
            QueryError::Criteria(_) | QueryError::Modifier(_) => ErrorOrigin::Criteria,
            QueryError::Render(_) => ErrorOrigin::Render,
            QueryError::Pagination(_) | QueryError::Cursor(_) => ErrorOrigin::Cursor,
            QueryError::Executor(_) => ErrorOrigin::Executor,
        };
        let kind = query_kind(err.class()).map_or(ErrorKind::Executor, ErrorKind::Query);

        Self::new(kind, origin, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    Query(QueryErrorKind),

    /// Configuration could not be loaded or failed validation.
    Config,

    /// The store failed; the message carries the executor's own error.
    Executor,
}

///
/// QueryErrorKind
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    /// Call-time arguments do not fit the declared shape.
    InvalidArgument,

    /// Leaf or combinator built with the wrong shape.
    InvalidCriteriaShape,

    /// Cursor string or payload could not be decoded.
    InvalidCursor,

    /// Page size is zero or above the configured maximum.
    InvalidPagination,

    /// Unknown keyword, dangling conjunction, or argument mismatch.
    MalformedDescriptor,

    /// Subject path absent from the entity schema.
    UnknownProperty,

    UnsupportedNegation,

    UnsupportedOperatorCombination,
}

// `None` for failures outside the query itself.
const fn query_kind(class: ErrorClass) -> Option<QueryErrorKind> {
    let kind = match class {
        ErrorClass::MalformedDescriptor => QueryErrorKind::MalformedDescriptor,
        ErrorClass::InvalidCriteriaShape => QueryErrorKind::InvalidCriteriaShape,
        ErrorClass::UnsupportedNegation => QueryErrorKind::UnsupportedNegation,
        ErrorClass::UnsupportedOperatorCombination => {
            QueryErrorKind::UnsupportedOperatorCombination
        }
        ErrorClass::UnknownProperty => QueryErrorKind::UnknownProperty,
        ErrorClass::InvalidArgument => QueryErrorKind::InvalidArgument,
        ErrorClass::InvalidPagination => QueryErrorKind::InvalidPagination,
        ErrorClass::InvalidCursor => QueryErrorKind::InvalidCursor,
        ErrorClass::Executor => return None,
    };

    Some(kind)
}

///
/// ErrorOrigin
/// Subsystem that raised the error.
///

#[remain::sorted]
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Criteria,
    Cursor,
    Descriptor,
    Executor,
    Render,
}

///
/// TESTS
///
