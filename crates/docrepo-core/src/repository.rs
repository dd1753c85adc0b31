//! Module: repository
//! Responsibility: wire descriptor registry, renderer, and executor into one
//! per-entity query surface.
//! Does not own: row decoding, transport, or store semantics.
//! Boundary: the executor sees only rendered text, parameters, page size, and
//! the opaque continuation token; it returns rows plus the next token.

use crate::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_REQUEST_BYTES,
    cursor::{ContinuationToken, CursorError, Page, PageRequest},
    error::QueryError,
    model::PropertyResolver,
    obs::{NoopSink, QueryEvent, QueryEventSink},
    query::{
        criteria::Criteria,
        derived::{Arg, DerivedQuery},
        descriptor::ArgShape,
        registry::{CacheStats, QueryRegistry},
        render::{Dialect, DialectKind, QueryRenderer, QuerySpec, RenderedQuery},
        sort::SortSpec,
    },
};
use std::sync::Arc;

/// Failure type executors hand back; passed through untouched.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

///
/// FetchResult
///
/// Rows for one page plus the store's token for the next one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FetchResult<R> {
    pub rows: Vec<R>,
    pub continuation: Option<ContinuationToken>,
}

impl<R> FetchResult<R> {
    #[must_use]
    pub const fn new(rows: Vec<R>, continuation: Option<ContinuationToken>) -> Self {
        Self { rows, continuation }
    }

    /// Final page: no continuation.
    #[must_use]
    pub const fn last(rows: Vec<R>) -> Self {
        Self::new(rows, None)
    }
}

///
/// QueryExecutor
///
/// Store boundary. Implementations run one rendered query and report the
/// store's continuation token verbatim.
///

pub trait QueryExecutor: Send + Sync {
    type Row;

    fn execute(&self, query: &RenderedQuery) -> Result<FetchResult<Self::Row>, ExecutorError>;
}

///
/// RepositoryOptions
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepositoryOptions {
    pub dialect: DialectKind,
    /// Page size applied when a call carries no page request.
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub cache_enabled: bool,
    /// Upper bound on decoded cursor payloads.
    pub max_cursor_bytes: usize,
    /// Log rendered query text at debug level.
    pub debug: bool,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            dialect: DialectKind::default(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: 1_000,
            cache_enabled: true,
            max_cursor_bytes: MAX_PAGE_REQUEST_BYTES,
            debug: false,
        }
    }
}

///
/// Repository
///
/// Query surface for one entity. Holds no per-call state; every call renders
/// a fresh query from an immutable template.
///

pub struct Repository<X: QueryExecutor> {
    executor: X,
    resolver: Box<dyn PropertyResolver>,
    dialect: Box<dyn Dialect>,
    registry: QueryRegistry,
    sink: Arc<dyn QueryEventSink>,
    options: RepositoryOptions,
}

impl<X: QueryExecutor> Repository<X> {
    pub fn new(
        executor: X,
        resolver: impl PropertyResolver + 'static,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            executor,
            resolver: Box::new(resolver),
            dialect: options.dialect.dialect(),
            registry: QueryRegistry::new(options.cache_enabled),
            sink: Arc::new(NoopSink),
            options,
        }
    }

    /// Route query events into `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn QueryEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Enable debug logging of rendered query text.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.options.debug = true;
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    #[must_use]
    pub const fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.registry.stats()
    }

    // ------------------------------------------------------------------
    // Derived queries
    // ------------------------------------------------------------------

    /// Parse and validate `method` declared with `shape`.
    ///
    /// Call once per repository method at startup: every descriptor defect
    /// surfaces here rather than on first use.
    pub fn register(
        &self,
        method: &str,
        shape: &[ArgShape],
    ) -> Result<Arc<DerivedQuery>, QueryError> {
        self.registry
            .get_or_parse(method, shape, Some(self.resolver.as_ref()), self.sink.as_ref())
    }

    /// Run a derived query, taking the declared shape from the arguments.
    ///
    /// A list bound to an equality slot reads as a collection here; declare
    /// such methods through `register` and run them with `run`.
    pub fn find(&self, method: &str, args: &[Arg]) -> Result<Page<X::Row>, QueryError> {
        let shape: Vec<ArgShape> = args.iter().map(Arg::shape).collect();
        let query = self.register(method, &shape)?;

        self.run(&query, args)
    }

    /// Run a registered query with call-time arguments.
    pub fn run(&self, query: &DerivedQuery, args: &[Arg]) -> Result<Page<X::Row>, QueryError> {
        let spec = query.bind(args)?;

        self.execute(spec)
    }

    // ------------------------------------------------------------------
    // Programmatic queries
    // ------------------------------------------------------------------

    /// Fetch one page of rows matching a programmatically built tree.
    pub fn find_criteria(
        &self,
        criteria: Option<Criteria>,
        sort: SortSpec,
        page: Option<PageRequest>,
    ) -> Result<Page<X::Row>, QueryError> {
        let spec = QuerySpec::find(criteria).with_sort(sort).with_page(page);

        self.execute(spec)
    }

    /// Fetch every page of `spec`, following continuation tokens until the
    /// store reports the last page.
    pub fn fetch_all(&self, spec: QuerySpec) -> Result<Vec<X::Row>, QueryError> {
        let mut rows = Vec::new();
        let mut page = self.execute(spec.clone())?;

        loop {
            let next = page.next_request();
            rows.extend(page.into_items());

            let Some(request) = next else {
                return Ok(rows);
            };
            page = self.execute(spec.clone().with_page(Some(request)))?;
        }
    }

    /// Restore a page request from a transport cursor string.
    pub fn resume(&self, cursor: &str) -> Result<PageRequest, QueryError> {
        let request = PageRequest::from_cursor_string(cursor, self.options.max_cursor_bytes)?;
        request.check_max_size(self.options.max_page_size)?;

        Ok(request)
    }

    /// Encode `request` as a transport cursor string.
    pub fn cursor_string(request: &PageRequest) -> Result<String, QueryError> {
        request
            .to_cursor_string()
            .map_err(|err| CursorError::from(err).into())
    }

    // ------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------

    /// Render `spec` without executing it.
    pub fn render(&self, spec: &QuerySpec) -> Result<RenderedQuery, QueryError> {
        let rendered = QueryRenderer::new(self.dialect.as_ref(), self.resolver.as_ref())
            .render(spec)?;

        self.sink.record(QueryEvent::QueryRendered {
            action: rendered.action,
            parameters: rendered.parameters.len(),
            cross_partition: rendered.is_cross_partition(),
        });
        if self.options.debug {
            tracing::debug!(
                container = %rendered.container,
                query = %rendered.text,
                parameters = rendered.parameters.len(),
                "query"
            );
        }

        Ok(rendered)
    }

    /// Render and execute one page of `spec`.
    pub fn execute(&self, mut spec: QuerySpec) -> Result<Page<X::Row>, QueryError> {
        let request = match spec.page.take() {
            Some(request) => request,
            None => PageRequest::first(self.options.default_page_size)?,
        };
        request.check_max_size(self.options.max_page_size)?;
        spec.page = Some(request.clone());

        let rendered = self.render(&spec)?;
        let fetched = self
            .executor
            .execute(&rendered)
            .map_err(QueryError::Executor)?;

        let page = Page::new(fetched.rows, request, fetched.continuation);
        self.sink.record(QueryEvent::PageFetched {
            rows: page.len(),
            last_page: page.is_last_page(),
        });
        tracing::trace!(
            rows = page.len(),
            page_index = page.request().page_index(),
            last_page = page.is_last_page(),
            "fetched page"
        );

        Ok(page)
    }
}

///
/// TESTS
///
