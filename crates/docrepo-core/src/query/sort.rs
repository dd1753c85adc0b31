use crate::model::PropertyPath;
use derive_more::IntoIterator;
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Direction
///
/// Sort direction; a fixed two-valued enumeration.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

///
/// SortKey
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SortKey {
    pub property: PropertyPath,
    pub direction: Direction,
}

impl SortKey {
    #[must_use]
    pub fn new(property: impl Into<PropertyPath>, direction: Direction) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }
}

///
/// SortSpec
///
/// Ordered sort keys; declaration order is significant.
///

#[derive(
    Clone, Debug, Default, Deserialize, Eq, Hash, IntoIterator, Ord, PartialEq, PartialOrd, Serialize,
)]
#[into_iterator(owned, ref)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    #[must_use]
    pub const fn unsorted() -> Self {
        Self { keys: Vec::new() }
    }

    #[must_use]
    pub fn by(property: impl Into<PropertyPath>, direction: Direction) -> Self {
        Self {
            keys: vec![SortKey::new(property, direction)],
        }
    }

    #[must_use]
    pub fn asc(property: impl Into<PropertyPath>) -> Self {
        Self::by(property, Direction::Asc)
    }

    #[must_use]
    pub fn desc(property: impl Into<PropertyPath>) -> Self {
        Self::by(property, Direction::Desc)
    }

    /// Append one more key.
    #[must_use]
    pub fn then(mut self, property: impl Into<PropertyPath>, direction: Direction) -> Self {
        self.keys.push(SortKey::new(property, direction));
        self
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Append `other`'s keys after this spec's keys.
    ///
    /// A property already present keeps its first direction; later mentions
    /// are dropped.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut keys = self.keys.clone();
        for key in &other.keys {
            if !keys.iter().any(|existing| existing.property == key.property) {
                keys.push(key.clone());
            }
        }

        Self { keys }
    }
}

impl FromIterator<SortKey> for SortSpec {
    fn from_iter<T: IntoIterator<Item = SortKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_keeps_first_direction_for_duplicate_properties() {
        let static_sort = SortSpec::asc("lastName").then("age", Direction::Desc);
        let dynamic = SortSpec::desc("lastName").then("city", Direction::Asc);

        let merged = static_sort.merged(&dynamic);

        assert_eq!(
            merged.keys(),
            &[
                SortKey::new("lastName", Direction::Asc),
                SortKey::new("age", Direction::Desc),
                SortKey::new("city", Direction::Asc),
            ]
        );
    }

    #[test]
    fn into_iterator_preserves_declaration_order() {
        let spec = SortSpec::desc("b").then("a", Direction::Asc);
        let names: Vec<String> = spec
            .into_iter()
            .map(|key| key.property.to_string())
            .collect();

        assert_eq!(names, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn direction_keywords_are_fixed() {
        assert_eq!(Direction::Asc.to_string(), "ASC");
        assert_eq!(Direction::Desc.to_string(), "DESC");
        assert_eq!(Direction::default(), Direction::Asc);
    }
}
