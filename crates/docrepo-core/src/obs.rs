//! Query event sink boundary.
//!
//! Engine code never owns counters or global state. Instrumentation flows
//! through `QueryEvent` into a `QueryEventSink` handed in by the caller.

use crate::query::QueryAction;
use std::sync::atomic::{AtomicU64, Ordering};

///
/// QueryEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryEvent<'a> {
    DescriptorParsed {
        method: &'a str,
        clauses: usize,
    },
    CacheHit {
        method: &'a str,
    },
    CacheMiss {
        method: &'a str,
    },
    QueryRendered {
        action: QueryAction,
        parameters: usize,
        cross_partition: bool,
    },
    PageFetched {
        rows: usize,
        last_page: bool,
    },
}

///
/// QueryEventSink
///

pub trait QueryEventSink: Send + Sync {
    fn record(&self, event: QueryEvent<'_>);
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl QueryEventSink for NoopSink {
    fn record(&self, _event: QueryEvent<'_>) {}
}

///
/// CountingSink
///
/// Relaxed atomic counters; read them through `snapshot`.
///

#[derive(Debug, Default)]
pub struct CountingSink {
    descriptors_parsed: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    queries_rendered: AtomicU64,
    cross_partition_queries: AtomicU64,
    pages_fetched: AtomicU64,
    rows_fetched: AtomicU64,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> EventCounts {
        EventCounts {
            descriptors_parsed: self.descriptors_parsed.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            queries_rendered: self.queries_rendered.load(Ordering::Relaxed),
            cross_partition_queries: self.cross_partition_queries.load(Ordering::Relaxed),
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            rows_fetched: self.rows_fetched.load(Ordering::Relaxed),
        }
    }
}

impl QueryEventSink for CountingSink {
    fn record(&self, event: QueryEvent<'_>) {
        match event {
            QueryEvent::DescriptorParsed { .. } => {
                self.descriptors_parsed.fetch_add(1, Ordering::Relaxed);
            }
            QueryEvent::CacheHit { .. } => {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
            }
            QueryEvent::CacheMiss { .. } => {
                self.cache_misses.fetch_add(1, Ordering::Relaxed);
            }
            QueryEvent::QueryRendered {
                cross_partition, ..
            } => {
                self.queries_rendered.fetch_add(1, Ordering::Relaxed);
                if cross_partition {
                    self.cross_partition_queries.fetch_add(1, Ordering::Relaxed);
                }
            }
            QueryEvent::PageFetched { rows, .. } => {
                self.pages_fetched.fetch_add(1, Ordering::Relaxed);
                self.rows_fetched
                    .fetch_add(u64::try_from(rows).unwrap_or(u64::MAX), Ordering::Relaxed);
            }
        }
    }
}

///
/// EventCounts
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EventCounts {
    pub descriptors_parsed: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub queries_rendered: u64,
    pub cross_partition_queries: u64,
    pub pages_fetched: u64,
    pub rows_fetched: u64,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_sink_tallies_events() {
        let sink = CountingSink::new();

        sink.record(QueryEvent::CacheMiss { method: "findByName" });
        sink.record(QueryEvent::DescriptorParsed {
            method: "findByName",
            clauses: 1,
        });
        sink.record(QueryEvent::CacheHit { method: "findByName" });
        sink.record(QueryEvent::QueryRendered {
            action: QueryAction::Find,
            parameters: 1,
            cross_partition: true,
        });
        sink.record(QueryEvent::PageFetched {
            rows: 7,
            last_page: true,
        });

        assert_eq!(
            sink.snapshot(),
            EventCounts {
                descriptors_parsed: 1,
                cache_hits: 1,
                cache_misses: 1,
                queries_rendered: 1,
                cross_partition_queries: 1,
                pages_fetched: 1,
                rows_fetched: 7,
            }
        );
    }
}
