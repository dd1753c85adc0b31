use crate::query::criteria::CriteriaKind;

///
/// OperatorKeyword
///
/// One entry of the operator suffix vocabulary.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OperatorKeyword {
    pub keyword: &'static str,
    pub kind: CriteriaKind,
}

const fn kw(keyword: &'static str, kind: CriteriaKind) -> OperatorKeyword {
    OperatorKeyword { keyword, kind }
}

/// Operator suffixes, longest first.
///
/// Matching walks the table in order and takes the first suffix hit, so a
/// keyword must precede every keyword that is one of its suffixes
/// (`GreaterThanEqual` before `ThanEqual`-style tails, `StartingWith` before
/// `With`-style tails). `Not` and `Is` are modifiers, stripped after the
/// operator keyword.
pub const OPERATOR_KEYWORDS: &[OperatorKeyword] = &[
    kw("GreaterThanEqual", CriteriaKind::GreaterThanEqual),
    kw("LessThanEqual", CriteriaKind::LessThanEqual),
    kw("MatchesRegex", CriteriaKind::Regex),
    kw("StartingWith", CriteriaKind::StartingWith),
    kw("GreaterThan", CriteriaKind::GreaterThan),
    kw("Containing", CriteriaKind::Containing),
    kw("EndingWith", CriteriaKind::EndingWith),
    kw("StartsWith", CriteriaKind::StartingWith),
    kw("LessThan", CriteriaKind::LessThan),
    kw("EndsWith", CriteriaKind::EndingWith),
    kw("Contains", CriteriaKind::Containing),
    kw("Between", CriteriaKind::Between),
    kw("Matches", CriteriaKind::Regex),
    kw("Exists", CriteriaKind::Exists),
    kw("Before", CriteriaKind::LessThan),
    kw("Equals", CriteriaKind::Equal),
    kw("Regex", CriteriaKind::Regex),
    kw("After", CriteriaKind::GreaterThan),
    kw("Empty", CriteriaKind::IsEmpty),
    kw("False", CriteriaKind::IsFalse),
    kw("Like", CriteriaKind::Like),
    kw("Near", CriteriaKind::Near),
    kw("Null", CriteriaKind::IsNull),
    kw("True", CriteriaKind::IsTrue),
    kw("In", CriteriaKind::In),
];

pub(super) const NOT: &str = "Not";
pub(super) const IS: &str = "Is";
pub(super) const AND: &str = "And";
pub(super) const OR: &str = "Or";

/// Case-insensitivity suffixes on one clause.
pub(super) const IGNORE_CASE: [[&str; 2]; 2] = [["Ignore", "Case"], ["Ignoring", "Case"]];

/// Case-insensitivity suffixes on the whole predicate.
pub(super) const ALL_IGNORE_CASE: [[&str; 3]; 2] =
    [["All", "Ignore", "Case"], ["All", "Ignoring", "Case"]];

/// Words that only ever occur inside an operator keyword; seeing one in a
/// property name means an operator was misspelled.
pub(super) const KEYWORD_FRAGMENTS: &[&str] = &[
    "Greater", "Less", "Than", "Starting", "Starts", "Ending", "Ends", "Ignore", "Ignoring",
];

/// Look up the longest operator keyword ending `words`.
///
/// Returns the split index (first keyword word) and the entry. A keyword
/// spanning the entire segment is not a match: the segment is a property.
pub(super) fn match_suffix(words: &[&str]) -> Option<(usize, OperatorKeyword)> {
    OPERATOR_KEYWORDS.iter().find_map(|entry| {
        super::lexer::ends_with_keyword(words, entry.keyword)
            .filter(|split| *split > 0)
            .map(|split| (split, *entry))
    })
}

/// Strip a trailing word sequence, returning the shortened slice on a hit.
pub(super) fn strip_words<'a, 'w>(words: &'a [&'w str], suffix: &[&str]) -> Option<&'a [&'w str]> {
    let split = words.len().checked_sub(suffix.len())?;
    let (rest, tail) = words.split_at(split);

    tail.iter().zip(suffix).all(|(a, b)| a == b).then_some(rest)
}
