//! Derived-query engine: descriptor parsing, criteria assembly, rendering.
//!
//! Flow: descriptor → clauses (`descriptor`) → criteria tree (`assemble`) →
//! query text + parameters (`render`). Programmatic callers enter at
//! `builder` and skip the first two stages.

pub mod assemble;
pub mod builder;
pub mod criteria;
pub mod derived;
pub mod descriptor;
pub mod fingerprint;
pub mod registry;
pub mod render;
pub mod sort;

///
/// Re-Exports
///
pub use criteria::{
    Arity, CombinatorCriteria, Criteria, CriteriaError, CriteriaKind, LeafCriteria, LogicalOp,
    ModifierError,
};
pub use descriptor::{ArgShape, Conjunction, DescriptorError, PredicateClause, QueryAction};
pub use render::{QuerySpec, RenderedQuery};
pub use sort::{Direction, SortKey, SortSpec};
