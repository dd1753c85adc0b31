use crate::{
    cursor::{CursorError, PageRequestError},
    query::{
        CriteriaError, DescriptorError, ModifierError, derived::BindError, render::RenderError,
    },
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Every failure the engine can surface. None are retried internally; the
/// class says which part of the caller's query is at fault.
///

#[derive(Debug, ThisError)]
pub enum QueryError {
    #[error("malformed descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("invalid criteria: {0}")]
    Criteria(#[from] CriteriaError),

    #[error("unsupported modifier: {0}")]
    Modifier(#[from] ModifierError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("invalid arguments: {0}")]
    Bind(#[from] BindError),

    #[error("invalid pagination: {0}")]
    Pagination(#[from] PageRequestError),

    #[error("invalid cursor: {0}")]
    Cursor(#[from] CursorError),

    /// Passed through from the executor unchanged.
    #[error("executor failed: {0}")]
    Executor(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Wrap an executor failure.
    pub fn executor(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Executor(err.into())
    }

    /// Stable classification independent of message text.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Descriptor(DescriptorError::UnknownProperty { .. })
            | Self::Render(RenderError::UnknownProperty { .. }) => ErrorClass::UnknownProperty,
            Self::Descriptor(_) => ErrorClass::MalformedDescriptor,
            Self::Criteria(_) => ErrorClass::InvalidCriteriaShape,
            Self::Modifier(err) | Self::Render(RenderError::Modifier(err)) => modifier_class(err),
            Self::Bind(_) => ErrorClass::InvalidArgument,
            Self::Pagination(_) | Self::Cursor(CursorError::Page(_)) => {
                ErrorClass::InvalidPagination
            }
            Self::Cursor(_) => ErrorClass::InvalidCursor,
            Self::Executor(_) => ErrorClass::Executor,
        }
    }
}

const fn modifier_class(err: &ModifierError) -> ErrorClass {
    match err {
        ModifierError::UnsupportedNegation { .. } => ErrorClass::UnsupportedNegation,
        ModifierError::UnsupportedOperatorCombination { .. } => {
            ErrorClass::UnsupportedOperatorCombination
        }
    }
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorClass {
    /// Unknown keyword, dangling conjunction, or argument mismatch.
    MalformedDescriptor,
    /// Leaf or combinator built with the wrong shape.
    InvalidCriteriaShape,
    UnsupportedNegation,
    UnsupportedOperatorCombination,
    /// Subject path absent from the entity schema.
    UnknownProperty,
    /// Call-time arguments do not match the declared shape.
    InvalidArgument,
    InvalidPagination,
    InvalidCursor,
    Executor,
}

impl ErrorClass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedDescriptor => "malformed_descriptor",
            Self::InvalidCriteriaShape => "invalid_criteria_shape",
            Self::UnsupportedNegation => "unsupported_negation",
            Self::UnsupportedOperatorCombination => "unsupported_operator_combination",
            Self::UnknownProperty => "unknown_property",
            Self::InvalidArgument => "invalid_argument",
            Self::InvalidPagination => "invalid_pagination",
            Self::InvalidCursor => "invalid_cursor",
            Self::Executor => "executor",
        }
    }

    /// True when the fault lies in the query declaration itself (and so is
    /// reported at registration when possible).
    #[must_use]
    pub const fn is_declaration_defect(self) -> bool {
        matches!(
            self,
            Self::MalformedDescriptor
                | Self::UnsupportedNegation
                | Self::UnsupportedOperatorCombination
                | Self::UnknownProperty
        )
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TESTS
///
