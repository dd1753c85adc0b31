//! Module: query::descriptor
//! Responsibility: predicate descriptors → ordered, argument-bound clauses.
//! Does not own: value binding, tree assembly, or rendering.
//! Boundary: every error here is a defect in the declared query and is
//! surfaced at registration time.

mod keyword;
mod lexer;
mod method;


pub use keyword::{OPERATOR_KEYWORDS, OperatorKeyword};
pub use method::{MethodDescriptor, QueryAction, Subject, parse_method_name};

use crate::{
    model::{PropertyPath, PropertyResolver},
    query::criteria::{Arity, CriteriaKind},
};
use convert_case::{Case, Casing};
use keyword::{
    ALL_IGNORE_CASE, AND, IGNORE_CASE, IS, KEYWORD_FRAGMENTS, NOT, OR, match_suffix, strip_words,
};
use lexer::{PATH_SEPARATOR, followed_by_capital};
use std::{fmt, ops::Range};
use thiserror::Error as ThisError;

///
/// ArgShape
///
/// Statically declared shape of one method argument.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ArgShape {
    /// One value bound to a clause slot.
    Scalar,
    /// One collection value bound to an `In` clause.
    Collection,
    /// Trailing dynamic sort.
    Sort,
    /// Trailing pagination request.
    Page,
}

impl ArgShape {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Scalar => 0x01,
            Self::Collection => 0x02,
            Self::Sort => 0x03,
            Self::Page => 0x04,
        }
    }

    #[must_use]
    pub const fn is_trailing(self) -> bool {
        matches!(self, Self::Sort | Self::Page)
    }
}

impl fmt::Display for ArgShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Scalar => "scalar",
            Self::Collection => "collection",
            Self::Sort => "sort",
            Self::Page => "page",
        };

        f.write_str(label)
    }
}

///
/// Conjunction
///
/// Logical connective to the clause that follows; `Terminal` on the last one.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Conjunction {
    And,
    Or,
    Terminal,
}

///
/// PredicateClause
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PredicateClause {
    pub property: PropertyPath,
    pub kind: CriteriaKind,
    pub negated: bool,
    pub ignore_case: bool,
    pub conjunction: Conjunction,
    /// Positions in the declared argument list bound to this clause.
    pub arguments: Range<usize>,
}

///
/// ParsedPredicate
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedPredicate {
    pub clauses: Vec<PredicateClause>,
    pub sort_argument: Option<usize>,
    pub page_argument: Option<usize>,
}

impl ParsedPredicate {
    /// Number of arguments bound to clauses.
    #[must_use]
    pub fn clause_arguments(&self) -> usize {
        self.clauses.iter().map(|clause| clause.arguments.len()).sum()
    }
}

///
/// DescriptorError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DescriptorError {
    #[error("descriptor is empty")]
    EmptyPredicate,

    #[error("invalid character '{character}' at byte {position} in '{descriptor}'")]
    InvalidCharacter {
        descriptor: String,
        character: char,
        position: usize,
    },

    #[error("conjunction at word {position} of '{descriptor}' has no property on both sides")]
    DanglingConjunction { descriptor: String, position: usize },

    #[error("clause '{segment}' names no property")]
    EmptyProperty { segment: String },

    #[error("clause '{segment}' has an empty nested path segment")]
    InvalidPropertyPath { segment: String },

    #[error("unknown operator keyword '{keyword}' in clause '{segment}'")]
    UnknownKeyword { segment: String, keyword: String },

    #[error("property '{path}' does not exist on entity '{entity}'")]
    UnknownProperty { entity: String, path: String },

    #[error("'{descriptor}' binds {required} argument(s) but {declared} were declared")]
    ArityMismatch {
        descriptor: String,
        required: usize,
        declared: usize,
    },

    #[error("argument {position} for '{property}' must be {expected}, found {found}")]
    ArgumentShape {
        property: String,
        position: usize,
        expected: ArgShape,
        found: ArgShape,
    },

    #[error("trailing {shape} argument declared more than once")]
    DuplicateTrailingArgument { shape: ArgShape },

    #[error("method '{method}' does not start with a known query subject")]
    UnknownSubject { method: String },

    #[error("invalid result limit '{word}' in method '{method}'")]
    InvalidLimit { method: String, word: String },

    #[error("invalid OrderBy clause '{segment}'")]
    InvalidOrderBy { segment: String },
}

impl DescriptorError {
    /// True when the descriptor named a property the schema does not have.
    #[must_use]
    pub const fn is_unknown_property(&self) -> bool {
        matches!(self, Self::UnknownProperty { .. })
    }
}

/// Parse a bare predicate descriptor (`NameAndEmailOrAddress`).
pub fn parse_predicate(
    descriptor: &str,
    shape: &[ArgShape],
    resolver: Option<&dyn PropertyResolver>,
) -> Result<ParsedPredicate, DescriptorError> {
    let words = lexer::words(descriptor)?;
    if words.is_empty() {
        return Err(DescriptorError::EmptyPredicate);
    }

    parse_words(&words, shape, resolver)
}

// Shared by `parse_predicate` and method-name parsing.
fn parse_words(
    words: &[&str],
    shape: &[ArgShape],
    resolver: Option<&dyn PropertyResolver>,
) -> Result<ParsedPredicate, DescriptorError> {
    let descriptor = words.concat();

    let (words, all_ignore_case) = ALL_IGNORE_CASE
        .iter()
        .find_map(|suffix| strip_words(words, suffix))
        .map_or((words, false), |rest| (rest, true));
    if words.is_empty() {
        return Err(DescriptorError::EmptyProperty {
            segment: descriptor,
        });
    }

    let mut drafts = Vec::new();
    for (segment, conjunction) in split_segments(words, &descriptor)? {
        let mut clause = parse_clause(segment, resolver)?;
        if all_ignore_case && clause.kind.supports_ignore_case() {
            clause.ignore_case = true;
        }
        clause.conjunction = conjunction;
        drafts.push(clause);
    }

    bind_arguments(drafts, shape, &descriptor)
}

// Split the word stream on conjunction tokens.
fn split_segments<'a, 'w>(
    words: &'a [&'w str],
    descriptor: &str,
) -> Result<Vec<(&'a [&'w str], Conjunction)>, DescriptorError> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (i, word) in words.iter().enumerate() {
        let conjunction = match *word {
            AND => Conjunction::And,
            OR => Conjunction::Or,
            _ => continue,
        };
        let last = i + 1 == words.len();
        if !last && !followed_by_capital(words, i) {
            continue;
        }
        if i == start || last {
            return Err(DescriptorError::DanglingConjunction {
                descriptor: descriptor.to_string(),
                position: i,
            });
        }

        segments.push((&words[start..i], conjunction));
        start = i + 1;
    }

    segments.push((&words[start..], Conjunction::Terminal));

    Ok(segments)
}

// Parse one `<Property>[Is][Not]<Keyword>[IgnoreCase]` segment.
fn parse_clause(
    words: &[&str],
    resolver: Option<&dyn PropertyResolver>,
) -> Result<PredicateClause, DescriptorError> {
    let segment = words.concat();

    let (rest, ignore_case) = IGNORE_CASE
        .iter()
        .find_map(|suffix| strip_words(words, suffix))
        .map_or((words, false), |rest| (rest, true));

    let (mut rest, kind) = match match_suffix(rest) {
        Some((split, entry)) => (&rest[..split], entry.kind),
        None => (rest, CriteriaKind::Equal),
    };

    let negated = match strip_words(rest, &[NOT]) {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };
    if let Some(stripped) = strip_words(rest, &[IS]) {
        rest = stripped;
    }

    if rest.is_empty() {
        return Err(DescriptorError::EmptyProperty { segment });
    }
    if let Some(fragment) = rest.iter().find(|word| KEYWORD_FRAGMENTS.contains(*word)) {
        return Err(DescriptorError::UnknownKeyword {
            keyword: (*fragment).to_string(),
            segment,
        });
    }

    let property = property_path(rest, &segment)?;
    if let Some(resolver) = resolver {
        check_resolves(rest, &property, resolver, &segment)?;
    }

    Ok(PredicateClause {
        property,
        kind,
        negated,
        ignore_case,
        conjunction: Conjunction::Terminal,
        arguments: 0..0,
    })
}

/// Convert property words to a dotted lower-camel path; `_` separates
/// nested segments.
fn property_path(words: &[&str], segment: &str) -> Result<PropertyPath, DescriptorError> {
    let mut parts = Vec::new();
    for group in words.split(|word| *word == PATH_SEPARATOR) {
        if group.is_empty() {
            return Err(DescriptorError::InvalidPropertyPath {
                segment: segment.to_string(),
            });
        }
        parts.push(group.concat().to_case(Case::Camel));
    }

    Ok(PropertyPath::new(parts.join(".")))
}

/// Report an unresolved path. When a leading run of its words does resolve,
/// the remainder is reported as an unknown operator keyword instead.
fn check_resolves(
    words: &[&str],
    path: &PropertyPath,
    resolver: &dyn PropertyResolver,
    segment: &str,
) -> Result<(), DescriptorError> {
    if resolver.resolves(path) {
        return Ok(());
    }

    for split in (1..words.len()).rev() {
        let Ok(prefix) = property_path(&words[..split], segment) else {
            continue;
        };
        if resolver.resolves(&prefix) {
            return Err(DescriptorError::UnknownKeyword {
                segment: segment.to_string(),
                keyword: words[split..].concat(),
            });
        }
    }

    Err(DescriptorError::UnknownProperty {
        entity: resolver.entity_name().to_string(),
        path: path.to_string(),
    })
}

// Consume declared arguments left to right; only a trailing Sort and/or
// Page may remain once every clause is bound.
fn bind_arguments(
    mut clauses: Vec<PredicateClause>,
    shape: &[ArgShape],
    descriptor: &str,
) -> Result<ParsedPredicate, DescriptorError> {
    let required: usize = clauses
        .iter()
        .map(|clause| clause.kind.arity().value_count())
        .sum();
    let declared = shape.iter().filter(|s| !s.is_trailing()).count();
    let arity_mismatch = || DescriptorError::ArityMismatch {
        descriptor: descriptor.to_string(),
        required,
        declared,
    };

    let mut cursor = 0;
    for clause in &mut clauses {
        let arity = clause.kind.arity();
        let expected = if arity == Arity::Collection {
            ArgShape::Collection
        } else {
            ArgShape::Scalar
        };

        let end = cursor + arity.value_count();
        for position in cursor..end {
            let found = *shape.get(position).ok_or_else(arity_mismatch)?;
            if found != expected {
                return Err(DescriptorError::ArgumentShape {
                    property: clause.property.to_string(),
                    position,
                    expected,
                    found,
                });
            }
        }

        clause.arguments = cursor..end;
        cursor = end;
    }

    let mut parsed = ParsedPredicate {
        clauses,
        sort_argument: None,
        page_argument: None,
    };
    for (position, found) in shape.iter().enumerate().skip(cursor) {
        let slot = match found {
            ArgShape::Sort => &mut parsed.sort_argument,
            ArgShape::Page => &mut parsed.page_argument,
            ArgShape::Scalar | ArgShape::Collection => return Err(arity_mismatch()),
        };
        if slot.replace(position).is_some() {
            return Err(DescriptorError::DuplicateTrailingArgument { shape: *found });
        }
    }

    Ok(parsed)
}
