use super::{
    ArgShape, DescriptorError, ParsedPredicate, bind_arguments, check_resolves, lexer,
    parse_words, property_path,
};
use crate::{
    model::{PropertyPath, PropertyResolver},
    query::sort::{Direction, SortSpec},
};
use serde::{Deserialize, Serialize};
use std::fmt;

const BY: &str = "By";
const ORDER: &str = "Order";

///
/// QueryAction
///
/// What a derived query does with the rows its predicate selects.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum QueryAction {
    #[default]
    Find,
    Count,
    Exists,
    Delete,
}

impl QueryAction {
    /// Map a method verb (`find`, `countBy`, ...) to its action.
    #[must_use]
    pub fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "find" | "read" | "get" | "query" | "search" | "stream" => Some(Self::Find),
            "count" => Some(Self::Count),
            "exists" => Some(Self::Exists),
            "delete" | "remove" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Actions that return rows and therefore honour ORDER BY.
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, Self::Find | Self::Delete)
    }
}

impl fmt::Display for QueryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Find => "find",
            Self::Count => "count",
            Self::Exists => "exists",
            Self::Delete => "delete",
        };

        f.write_str(label)
    }
}

///
/// Subject
///
/// Everything between the method verb and `By`.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Subject {
    pub action: QueryAction,
    pub distinct: bool,
    /// `First<N>` / `Top<N>` result cap.
    pub limit: Option<u32>,
}

///
/// MethodDescriptor
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MethodDescriptor {
    pub subject: Subject,
    pub predicate: ParsedPredicate,
    /// Static `OrderBy` keys declared in the method name.
    pub order_by: SortSpec,
}

/// Parse a full repository method name:
/// `<verb>[Distinct][First<N>|Top<N>][All]By<predicate>[OrderBy<sort>]`.
pub fn parse_method_name(
    method: &str,
    shape: &[ArgShape],
    resolver: Option<&dyn PropertyResolver>,
) -> Result<MethodDescriptor, DescriptorError> {
    let words = lexer::words(method)?;
    let unknown_subject = || DescriptorError::UnknownSubject {
        method: method.to_string(),
    };

    let (verb, rest) = words.split_first().ok_or_else(unknown_subject)?;
    let action = QueryAction::from_verb(verb).ok_or_else(unknown_subject)?;

    // Subject `By` is the first `By` that does not close an `OrderBy`.
    let subject_by = rest
        .iter()
        .enumerate()
        .position(|(i, word)| *word == BY && (i == 0 || rest[i - 1] != ORDER));

    let (subject_words, tail, explicit_by) = match subject_by {
        Some(i) => (&rest[..i], &rest[i + 1..], true),
        None => {
            let order = find_order_by(rest).unwrap_or(rest.len());
            (&rest[..order], &rest[order..], false)
        }
    };

    let subject = parse_subject(action, subject_words, method)?;

    let (predicate_words, order_words) = match find_order_by(tail) {
        Some(i) => (&tail[..i], Some(&tail[i + 2..])),
        None => (tail, None),
    };

    let predicate = if predicate_words.is_empty() {
        // `findAllByOrderByName` sorts everything; a bare `findBy` says nothing.
        if explicit_by && order_words.is_none() {
            return Err(DescriptorError::EmptyPredicate);
        }
        bind_arguments(Vec::new(), shape, method)?
    } else {
        parse_words(predicate_words, shape, resolver)?
    };

    let order_by = match order_words {
        Some(words) => parse_order_by(words, resolver)?,
        None => SortSpec::unsorted(),
    };

    tracing::trace!(
        method,
        action = %subject.action,
        clauses = predicate.clauses.len(),
        order_keys = order_by.keys().len(),
        "parsed method descriptor"
    );

    Ok(MethodDescriptor {
        subject,
        predicate,
        order_by,
    })
}

fn find_order_by(words: &[&str]) -> Option<usize> {
    words.windows(2).position(|pair| pair == [ORDER, BY])
}

fn parse_subject(
    action: QueryAction,
    words: &[&str],
    method: &str,
) -> Result<Subject, DescriptorError> {
    let mut subject = Subject {
        action,
        ..Subject::default()
    };

    for word in words {
        if *word == "Distinct" {
            subject.distinct = true;
            continue;
        }

        let Some(count) = word
            .strip_prefix("First")
            .or_else(|| word.strip_prefix("Top"))
        else {
            // Free text (`findPeopleBy`, `findAllBy`) carries no meaning.
            continue;
        };

        let invalid = || DescriptorError::InvalidLimit {
            method: method.to_string(),
            word: (*word).to_string(),
        };
        let limit = if count.is_empty() {
            1
        } else {
            count.parse::<u32>().map_err(|_| invalid())?
        };
        if limit == 0 || subject.limit.is_some() {
            return Err(invalid());
        }
        subject.limit = Some(limit);
    }

    Ok(subject)
}

// `LastNameAscAgeDesc` → lastName ASC, age DESC. A trailing key without a
// direction sorts ascending.
fn parse_order_by(
    words: &[&str],
    resolver: Option<&dyn PropertyResolver>,
) -> Result<SortSpec, DescriptorError> {
    let segment = words.concat();
    let invalid = || DescriptorError::InvalidOrderBy {
        segment: segment.clone(),
    };
    if words.is_empty() {
        return Err(invalid());
    }

    let mut sort = SortSpec::unsorted();
    let mut start = 0;
    for (i, word) in words.iter().enumerate() {
        let direction = match *word {
            "Asc" => Direction::Asc,
            "Desc" => Direction::Desc,
            _ => continue,
        };
        if i == start {
            return Err(invalid());
        }
        sort = sort.then(order_key(&words[start..i], resolver, &segment)?, direction);
        start = i + 1;
    }
    if start < words.len() {
        sort = sort.then(order_key(&words[start..], resolver, &segment)?, Direction::Asc);
    }

    Ok(sort)
}

fn order_key(
    words: &[&str],
    resolver: Option<&dyn PropertyResolver>,
    segment: &str,
) -> Result<PropertyPath, DescriptorError> {
    let path = property_path(words, segment)?;
    if let Some(resolver) = resolver {
        check_resolves(words, &path, resolver, segment)?;
    }

    Ok(path)
}
