//! Derived-query template cache, owned by one repository instance.
//!
//! Parsing is deterministic, so templates are keyed by descriptor
//! fingerprint and shared as `Arc`s. A disabled registry parses on every call.

use crate::{
    error::QueryError,
    model::PropertyResolver,
    obs::{QueryEvent, QueryEventSink},
    query::{derived::DerivedQuery, descriptor::ArgShape, fingerprint::DescriptorFingerprint},
};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

///
/// CacheStats
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

///
/// QueryRegistry
///

#[derive(Debug)]
pub struct QueryRegistry {
    enabled: bool,
    templates: Mutex<BTreeMap<DescriptorFingerprint, Arc<DerivedQuery>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryRegistry {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            templates: Mutex::new(BTreeMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Return the cached template for `method`/`shape`, parsing it on a miss.
    ///
    /// Parse failures are never cached; the same descriptor fails again on
    /// the next call.
    pub fn get_or_parse(
        &self,
        method: &str,
        shape: &[ArgShape],
        resolver: Option<&dyn PropertyResolver>,
        sink: &dyn QueryEventSink,
    ) -> Result<Arc<DerivedQuery>, QueryError> {
        let fingerprint = DescriptorFingerprint::of(method, shape);

        if self.enabled
            && let Some(query) = self.lock().get(&fingerprint).cloned()
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            sink.record(QueryEvent::CacheHit { method });
            tracing::trace!(method, %fingerprint, "derived query cache hit");

            return Ok(query);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        sink.record(QueryEvent::CacheMiss { method });

        let query = Arc::new(DerivedQuery::parse(method, shape, resolver)?);
        sink.record(QueryEvent::DescriptorParsed {
            method,
            clauses: query.descriptor().predicate.clauses.len(),
        });
        tracing::debug!(method, %fingerprint, "parsed derived query");

        if self.enabled {
            // A racing parse of the same descriptor yields an equal template.
            self.lock()
                .entry(fingerprint)
                .or_insert_with(|| Arc::clone(&query));
        }

        Ok(query)
    }

    /// Best-effort counters; relaxed atomics are enough for reporting.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.lock().len(),
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    // Templates are immutable once inserted, so a poisoned map is still valid.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<DescriptorFingerprint, Arc<DerivedQuery>>> {
        self.templates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueryRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::EntitySchema,
        obs::{CountingSink, NoopSink},
    };

    fn schema() -> EntitySchema {
        EntitySchema::new("Person").with_properties(["name", "email"])
    }

    #[test]
    fn second_lookup_hits_the_cache() {
        let registry = QueryRegistry::default();
        let schema = schema();
        let sink = CountingSink::new();

        let first = registry
            .get_or_parse("findByName", &[ArgShape::Scalar], Some(&schema), &sink)
            .expect("first parse should succeed");
        let second = registry
            .get_or_parse("findByName", &[ArgShape::Scalar], Some(&schema), &sink)
            .expect("cached lookup should succeed");

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            registry.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                size: 1,
            }
        );
        let counts = sink.snapshot();
        assert_eq!(counts.cache_hits, 1);
        assert_eq!(counts.descriptors_parsed, 1);
    }

    #[test]
    fn disabled_registry_always_parses() {
        let registry = QueryRegistry::new(false);
        let schema = schema();

        for _ in 0..3 {
            registry
                .get_or_parse("findByEmail", &[ArgShape::Scalar], Some(&schema), &NoopSink)
                .expect("parse should succeed");
        }

        let stats = registry.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 3);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn failed_parse_is_not_cached() {
        let registry = QueryRegistry::default();
        let schema = schema();

        for _ in 0..2 {
            registry
                .get_or_parse("findByNickname", &[ArgShape::Scalar], Some(&schema), &NoopSink)
                .expect_err("unknown property should fail");
        }

        assert_eq!(registry.stats().size, 0);
        assert_eq!(registry.stats().misses, 2);
    }

    #[test]
    fn clear_resets_templates_and_counters() {
        let registry = QueryRegistry::default();
        registry
            .get_or_parse("findByName", &[ArgShape::Scalar], None, &NoopSink)
            .expect("parse should succeed");

        registry.clear();

        assert_eq!(registry.stats(), CacheStats::default());
    }
}
