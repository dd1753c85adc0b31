//! Module: query::criteria
//! Responsibility: the criteria tree and its construction-time invariants.
//! Does not own: descriptor parsing, rendering, or schema resolution.
//! Boundary: every tree reaching the renderer has already passed shape checks here.


use crate::{model::PropertyPath, value::Value};
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};
use thiserror::Error as ThisError;

///
/// Criteria Tree
///
/// Immutable binary predicate tree.
///
/// - Leaves carry subject + operator + bound values (+ modifiers).
/// - Combinators carry exactly two children and nothing else.
///
/// Trees own all their data and are `Send + Sync`; share them freely once
/// built. Modifier compatibility (negation, ignore-case) is checked by
/// `validate_modifiers`, which the renderer and derived-query registration
/// both call.
///

///
/// CriteriaKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum CriteriaKind {
    Equal = 0x01,
    LessThan = 0x02,
    LessThanEqual = 0x03,
    GreaterThan = 0x04,
    GreaterThanEqual = 0x05,
    Between = 0x06,
    Containing = 0x07,
    StartingWith = 0x08,
    EndingWith = 0x09,
    Like = 0x0a,
    Regex = 0x0b,
    In = 0x0c,
    Near = 0x0d,
    IsNull = 0x0e,
    IsEmpty = 0x0f,
    Exists = 0x10,
    IsTrue = 0x11,
    IsFalse = 0x12,
    And = 0x40,
    Or = 0x41,
}

impl CriteriaKind {
    /// Every leaf operator, in tag order.
    pub const LEAF_KINDS: [Self; 18] = [
        Self::Equal,
        Self::LessThan,
        Self::LessThanEqual,
        Self::GreaterThan,
        Self::GreaterThanEqual,
        Self::Between,
        Self::Containing,
        Self::StartingWith,
        Self::EndingWith,
        Self::Like,
        Self::Regex,
        Self::In,
        Self::Near,
        Self::IsNull,
        Self::IsEmpty,
        Self::Exists,
        Self::IsTrue,
        Self::IsFalse,
    ];

    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn is_combinator(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Bound-value arity for leaf kinds; combinators report `Children`.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::IsNull | Self::IsEmpty | Self::Exists | Self::IsTrue | Self::IsFalse => {
                Arity::Nullary
            }
            Self::Between | Self::Near => Arity::Binary,
            Self::In => Arity::Collection,
            Self::And | Self::Or => Arity::Children,
            Self::Equal
            | Self::LessThan
            | Self::LessThanEqual
            | Self::GreaterThan
            | Self::GreaterThanEqual
            | Self::Containing
            | Self::StartingWith
            | Self::EndingWith
            | Self::Like
            | Self::Regex => Arity::Unary,
        }
    }

    /// Spatial proximity has no well-defined complement in the store.
    #[must_use]
    pub const fn supports_negation(self) -> bool {
        !matches!(self, Self::Near | Self::And | Self::Or)
    }

    /// String-comparable operators accept case-insensitive comparison.
    #[must_use]
    pub const fn supports_ignore_case(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::LessThan
                | Self::LessThanEqual
                | Self::GreaterThan
                | Self::GreaterThanEqual
                | Self::Between
                | Self::Containing
                | Self::StartingWith
                | Self::EndingWith
                | Self::Like
                | Self::In
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::LessThan => "LessThan",
            Self::LessThanEqual => "LessThanEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanEqual => "GreaterThanEqual",
            Self::Between => "Between",
            Self::Containing => "Containing",
            Self::StartingWith => "StartingWith",
            Self::EndingWith => "EndingWith",
            Self::Like => "Like",
            Self::Regex => "Regex",
            Self::In => "In",
            Self::Near => "Near",
            Self::IsNull => "IsNull",
            Self::IsEmpty => "IsEmpty",
            Self::Exists => "Exists",
            Self::IsTrue => "IsTrue",
            Self::IsFalse => "IsFalse",
            Self::And => "And",
            Self::Or => "Or",
        }
    }
}

impl fmt::Display for CriteriaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Arity
///
/// How many bound values a leaf kind carries.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    /// Unary checks (null/empty/exists/true/false); no values.
    Nullary,
    /// One scalar value.
    Unary,
    /// Two scalar values (between bounds, near point + distance).
    Binary,
    /// One non-empty collection value.
    Collection,
    /// Combinators: two children, no values.
    Children,
}

impl Arity {
    /// Number of bound values (and declared arguments) consumed.
    #[must_use]
    pub const fn value_count(self) -> usize {
        match self {
            Self::Nullary | Self::Children => 0,
            Self::Unary | Self::Collection => 1,
            Self::Binary => 2,
        }
    }
}

///
/// LogicalOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    #[must_use]
    pub const fn kind(self) -> CriteriaKind {
        match self {
            Self::And => CriteriaKind::And,
            Self::Or => CriteriaKind::Or,
        }
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

///
/// CriteriaError
///
/// Construction-time shape violations.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CriteriaError {
    #[error("criteria subject '{path}' is not a well-formed property path")]
    InvalidSubject { path: String },

    #[error("{kind} is a combinator and cannot be built as a leaf")]
    CombinatorAsLeaf { kind: CriteriaKind },

    #[error("{kind} on '{subject}' expects {expected} value(s), found {found}")]
    ValueCountMismatch {
        kind: CriteriaKind,
        subject: String,
        expected: usize,
        found: usize,
    },

    #[error("{kind} on '{subject}' expects a collection value, found {found}")]
    ExpectedCollection {
        kind: CriteriaKind,
        subject: String,
        found: &'static str,
    },

    #[error("{kind} on '{subject}' requires a non-empty collection")]
    EmptyCollection { kind: CriteriaKind, subject: String },

    #[error("{kind} on '{subject}' expects a scalar value at position {position}, found a list")]
    UnexpectedCollection {
        kind: CriteriaKind,
        subject: String,
        position: usize,
    },

    #[error("Near on '{subject}' expects (point, distance), found ({point}, {distance})")]
    InvalidProximity {
        subject: String,
        point: &'static str,
        distance: &'static str,
    },

    #[error("modifiers apply to leaf criteria only; found {kind}")]
    ModifierOnCombinator { kind: CriteriaKind },

    #[error("clause {position} carries a conjunction that does not match its position")]
    ClauseSequence { position: usize },
}

///
/// ModifierError
///
/// Modifier/operator incompatibilities. Raised by the renderer and, for
/// derived queries, at registration time.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ModifierError {
    #[error("{kind} on '{subject}' cannot be negated")]
    UnsupportedNegation { kind: CriteriaKind, subject: String },

    #[error("{kind} on '{subject}' does not support the {modifier} modifier")]
    UnsupportedOperatorCombination {
        kind: CriteriaKind,
        subject: String,
        modifier: &'static str,
    },
}

/// Check one operator/modifier combination.
pub fn check_modifiers(
    kind: CriteriaKind,
    subject: &PropertyPath,
    negated: bool,
    ignore_case: bool,
) -> Result<(), ModifierError> {
    if negated && !kind.supports_negation() {
        return Err(ModifierError::UnsupportedNegation {
            kind,
            subject: subject.to_string(),
        });
    }
    if ignore_case && !kind.supports_ignore_case() {
        return Err(ModifierError::UnsupportedOperatorCombination {
            kind,
            subject: subject.to_string(),
            modifier: "IgnoreCase",
        });
    }

    Ok(())
}

///
/// LeafCriteria
///

#[derive(Clone, Debug, PartialEq)]
pub struct LeafCriteria {
    kind: CriteriaKind,
    subject: PropertyPath,
    values: Vec<Value>,
    ignore_case: bool,
    negated: bool,
}

impl LeafCriteria {
    /// Build a leaf, enforcing subject and value-arity invariants.
    pub fn new(
        kind: CriteriaKind,
        subject: impl Into<PropertyPath>,
        values: Vec<Value>,
    ) -> Result<Self, CriteriaError> {
        let subject = subject.into();
        if !subject.is_well_formed() {
            return Err(CriteriaError::InvalidSubject {
                path: subject.to_string(),
            });
        }

        check_values(kind, &subject, &values)?;

        Ok(Self {
            kind,
            subject,
            values,
            ignore_case: false,
            negated: false,
        })
    }

    #[must_use]
    pub const fn kind(&self) -> CriteriaKind {
        self.kind
    }

    #[must_use]
    pub const fn subject(&self) -> &PropertyPath {
        &self.subject
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    #[must_use]
    pub const fn is_ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Toggle negation. `NOT NOT x` collapses back to `x`.
    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    #[must_use]
    pub const fn ignoring_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, negated: bool, ignore_case: bool) -> Self {
        self.negated = negated;
        self.ignore_case = ignore_case;
        self
    }

    pub fn validate_modifiers(&self) -> Result<(), ModifierError> {
        check_modifiers(self.kind, &self.subject, self.negated, self.ignore_case)
    }
}

// Enforce per-kind value arity and shape.
fn check_values(
    kind: CriteriaKind,
    subject: &PropertyPath,
    values: &[Value],
) -> Result<(), CriteriaError> {
    let arity = kind.arity();
    if arity == Arity::Children {
        return Err(CriteriaError::CombinatorAsLeaf { kind });
    }

    let expected = arity.value_count();
    if values.len() != expected {
        return Err(CriteriaError::ValueCountMismatch {
            kind,
            subject: subject.to_string(),
            expected,
            found: values.len(),
        });
    }

    match arity {
        Arity::Collection => match &values[0] {
            Value::List(items) if items.is_empty() => Err(CriteriaError::EmptyCollection {
                kind,
                subject: subject.to_string(),
            }),
            Value::List(_) => Ok(()),
            other => Err(CriteriaError::ExpectedCollection {
                kind,
                subject: subject.to_string(),
                found: other.type_name(),
            }),
        },
        _ if kind == CriteriaKind::Near => match (&values[0], &values[1]) {
            (Value::Point(_), distance) if distance.is_numeric() => Ok(()),
            (point, distance) => Err(CriteriaError::InvalidProximity {
                subject: subject.to_string(),
                point: point.type_name(),
                distance: distance.type_name(),
            }),
        },
        // Equality against an array literal is legal; ordering/containment is not.
        _ if kind == CriteriaKind::Equal => Ok(()),
        _ => match values.iter().position(Value::is_collection) {
            Some(position) => Err(CriteriaError::UnexpectedCollection {
                kind,
                subject: subject.to_string(),
                position,
            }),
            None => Ok(()),
        },
    }
}

///
/// CombinatorCriteria
///

#[derive(Clone, Debug, PartialEq)]
pub struct CombinatorCriteria {
    op: LogicalOp,
    children: Box<[Criteria; 2]>,
}

impl CombinatorCriteria {
    #[must_use]
    pub const fn op(&self) -> LogicalOp {
        self.op
    }

    #[must_use]
    pub fn left(&self) -> &Criteria {
        &self.children[0]
    }

    #[must_use]
    pub fn right(&self) -> &Criteria {
        &self.children[1]
    }

    #[must_use]
    pub fn children(&self) -> &[Criteria; 2] {
        &self.children
    }
}

///
/// Criteria
///

#[derive(Clone, Debug, PartialEq)]
pub enum Criteria {
    Leaf(LeafCriteria),
    Combinator(CombinatorCriteria),
}

impl Criteria {
    /// Build a leaf node.
    pub fn leaf(
        kind: CriteriaKind,
        subject: impl Into<PropertyPath>,
        values: Vec<Value>,
    ) -> Result<Self, CriteriaError> {
        LeafCriteria::new(kind, subject, values).map(Self::Leaf)
    }

    /// Combine two trees; always yields exactly two children.
    #[must_use]
    pub fn combine(op: LogicalOp, left: Self, right: Self) -> Self {
        Self::Combinator(CombinatorCriteria {
            op,
            children: Box::new([left, right]),
        })
    }

    #[must_use]
    pub fn and(self, rhs: Self) -> Self {
        Self::combine(LogicalOp::And, self, rhs)
    }

    #[must_use]
    pub fn or(self, rhs: Self) -> Self {
        Self::combine(LogicalOp::Or, self, rhs)
    }

    #[must_use]
    pub const fn kind(&self) -> CriteriaKind {
        match self {
            Self::Leaf(leaf) => leaf.kind,
            Self::Combinator(node) => node.op.kind(),
        }
    }

    /// Subject path; `None` for combinators.
    #[must_use]
    pub const fn subject(&self) -> Option<&PropertyPath> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.subject),
            Self::Combinator(_) => None,
        }
    }

    /// Bound values; empty for combinators.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Leaf(leaf) => &leaf.values,
            Self::Combinator(_) => &[],
        }
    }

    /// Children; empty for leaves, exactly two for combinators.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Leaf(_) => &[],
            Self::Combinator(node) => node.children.as_slice(),
        }
    }

    #[must_use]
    pub const fn is_negated(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.negated,
            Self::Combinator(_) => false,
        }
    }

    #[must_use]
    pub const fn is_ignore_case(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.ignore_case,
            Self::Combinator(_) => false,
        }
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafCriteria> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Combinator(_) => None,
        }
    }

    /// Toggle negation on a leaf.
    pub fn negate(self) -> Result<Self, CriteriaError> {
        match self {
            Self::Leaf(leaf) => Ok(Self::Leaf(leaf.negate())),
            Self::Combinator(node) => Err(CriteriaError::ModifierOnCombinator {
                kind: node.op.kind(),
            }),
        }
    }

    /// Mark a leaf as case-insensitive.
    pub fn ignoring_case(self) -> Result<Self, CriteriaError> {
        match self {
            Self::Leaf(leaf) => Ok(Self::Leaf(leaf.ignoring_case())),
            Self::Combinator(node) => Err(CriteriaError::ModifierOnCombinator {
                kind: node.op.kind(),
            }),
        }
    }

    /// Leaves in depth-first, left-to-right order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&LeafCriteria> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Check every leaf's modifiers.
    pub fn validate_modifiers(&self) -> Result<(), ModifierError> {
        self.leaves()
            .into_iter()
            .try_for_each(LeafCriteria::validate_modifiers)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Combinator(node) => 1 + node.left().depth().max(node.right().depth()),
        }
    }
}

fn collect_leaves<'a>(node: &'a Criteria, out: &mut Vec<&'a LeafCriteria>) {
    match node {
        Criteria::Leaf(leaf) => out.push(leaf),
        Criteria::Combinator(node) => {
            collect_leaves(node.left(), out);
            collect_leaves(node.right(), out);
        }
    }
}

impl From<LeafCriteria> for Criteria {
    fn from(leaf: LeafCriteria) -> Self {
        Self::Leaf(leaf)
    }
}

impl BitAnd for Criteria {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl BitOr for Criteria {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

// Compact structural form used in logs and tests: `OR(AND(name=?,email=?),address=?)`.
impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => {
                if leaf.negated {
                    f.write_str("!")?;
                }
                if leaf.kind == CriteriaKind::Equal {
                    write!(f, "{}=?", leaf.subject)
                } else {
                    write!(f, "{}:{}", leaf.subject, leaf.kind)
                }
            }
            Self::Combinator(node) => write!(
                f,
                "{}({},{})",
                node.op.keyword(),
                node.left(),
                node.right()
            ),
        }
    }
}
