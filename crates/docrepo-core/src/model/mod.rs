//! Module: model
//! Responsibility: property paths and the entity schema used to resolve them.
//! Does not own: entity-to-document mapping or (de)serialization.
//! Boundary: the renderer and descriptor parser only ask "does this path exist?".

#[cfg(test)]
mod tests;

use derive_more::{Deref, Display};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// PropertyPath
///
/// Dot-addressable property path (`address.city`).
/// Construction is infallible; shape checks happen where a path becomes a
/// criteria subject, and existence checks happen against a resolver.
///

#[derive(
    Clone, Debug, Deref, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct PropertyPath(String);

impl PropertyPath {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate the dot-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// True when every dot-separated segment is an identifier
    /// (`[A-Za-z_][A-Za-z0-9_]*`). Only such paths are spliced into query text.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.segments().all(is_identifier)
    }

    /// True if `self` is `other` or a parent path of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0 == self.0
            || (other.0.starts_with(&self.0) && other.0.as_bytes().get(self.0.len()) == Some(&b'.'))
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();

    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for PropertyPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl AsRef<str> for PropertyPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

///
/// PropertyResolver
///
/// Entity-schema boundary consulted by the parser and renderer.
/// Implementations only answer whether a path exists; mapping a path onto a
/// document field is the resolver owner's concern.
///

pub trait PropertyResolver: Send + Sync {
    /// Stable entity name used in diagnostics.
    fn entity_name(&self) -> &str;

    /// Container (collection) queried for this entity.
    fn container(&self) -> &str;

    /// True if `path` addresses a property of the entity.
    fn resolves(&self, path: &PropertyPath) -> bool;

    /// Partition key path, when the store partitions this entity.
    fn partition_key(&self) -> Option<&PropertyPath> {
        None
    }
}

///
/// EntitySchema
///
/// Declared property set for one entity.
/// Declaring `address.city` implicitly makes `address` resolvable.
/// The document id (`id`) always resolves.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntitySchema {
    entity_name: String,
    container: String,
    properties: BTreeSet<PropertyPath>,
    partition_key: Option<PropertyPath>,
}

impl EntitySchema {
    /// Create a schema for `entity_name`; the container defaults to the entity name.
    #[must_use]
    pub fn new(entity_name: impl Into<String>) -> Self {
        let entity_name = entity_name.into();

        Self {
            container: entity_name.clone(),
            entity_name,
            properties: BTreeSet::from([PropertyPath::new("id")]),
            partition_key: None,
        }
    }

    #[must_use]
    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = container.into();
        self
    }

    #[must_use]
    pub fn with_property(mut self, path: impl Into<PropertyPath>) -> Self {
        self.properties.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_properties<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PropertyPath>,
    {
        self.properties.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Declare the partition key; the key is also registered as a property.
    #[must_use]
    pub fn with_partition_key(mut self, path: impl Into<PropertyPath>) -> Self {
        let path = path.into();
        self.properties.insert(path.clone());
        self.partition_key = Some(path);
        self
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyPath> {
        self.properties.iter()
    }
}

impl PropertyResolver for EntitySchema {
    fn entity_name(&self) -> &str {
        &self.entity_name
    }

    fn container(&self) -> &str {
        &self.container
    }

    fn resolves(&self, path: &PropertyPath) -> bool {
        path.is_well_formed()
            && self
                .properties
                .iter()
                .any(|declared| path.is_prefix_of(declared))
    }

    fn partition_key(&self) -> Option<&PropertyPath> {
        self.partition_key.as_ref()
    }
}

///
/// OpenSchema
///
/// Schemaless resolver: every well-formed path resolves.
/// Used for programmatic queries against entities without a declared schema.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OpenSchema {
    container: String,
}

impl OpenSchema {
    #[must_use]
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
        }
    }
}

impl PropertyResolver for OpenSchema {
    fn entity_name(&self) -> &str {
        &self.container
    }

    fn container(&self) -> &str {
        &self.container
    }

    fn resolves(&self, path: &PropertyPath) -> bool {
        path.is_well_formed()
    }
}
