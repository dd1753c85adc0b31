use docrepo::{
    config::RepositoryConfig,
    core::{query::render::RenderedQuery, repository::ExecutorError},
    error::{ErrorKind, QueryErrorKind},
    prelude::*,
};
use proptest::prelude::*;
use std::sync::Mutex;

// Records every rendered query and returns one page of canned rows.
#[derive(Default)]
struct RecordingExecutor {
    queries: Mutex<Vec<RenderedQuery>>,
    next: Option<ContinuationToken>,
}

impl RecordingExecutor {
    fn last(&self) -> RenderedQuery {
        self.queries
            .lock()
            .expect("lock should not be poisoned")
            .last()
            .cloned()
            .expect("a query should have run")
    }
}

impl QueryExecutor for RecordingExecutor {
    type Row = String;

    fn execute(&self, query: &RenderedQuery) -> Result<FetchResult<String>, ExecutorError> {
        self.queries
            .lock()
            .expect("lock should not be poisoned")
            .push(query.clone());

        Ok(FetchResult::new(vec!["row".to_string()], self.next.clone()))
    }
}

fn person() -> EntitySchema {
    EntitySchema::new("Person")
        .with_container("people")
        .with_properties(["name", "email", "address.city", "age", "active"])
        .with_partition_key("tenant")
}

fn open(config: &str) -> Repository<RecordingExecutor> {
    let config = RepositoryConfig::from_toml_str(config).expect("config should parse");

    open_repository(RecordingExecutor::default(), person(), &config)
        .expect("repository should open")
}

#[test]
fn derived_query_renders_with_or_grouped() {
    let repo = open("");

    repo.find(
        "findByNameAndEmailOrAddress_City",
        &[Arg::value("ada"), Arg::value("ada@x.io"), Arg::value("London")],
    )
    .expect("query should run");

    let query = repo.executor().last();
    assert_eq!(
        query.text,
        "SELECT * FROM people WHERE ((name = ? AND email = ?) OR address.city = ?)"
    );
    let values: Vec<_> = query.values().cloned().collect();
    assert_eq!(
        values,
        vec![
            Value::from("ada"),
            Value::from("ada@x.io"),
            Value::from("London")
        ]
    );
    assert!(query.is_cross_partition());
}

#[test]
fn cosmos_config_targets_pinned_partition() {
    let repo = open("dialect = \"cosmos\"\ncontainer = \"persons_v2\"");

    repo.find(
        "findTop3ByTenantAndAgeGreaterThanOrderByAgeDesc",
        &[Arg::value("acme"), Arg::value(21)],
    )
    .expect("query should run");

    let query = repo.executor().last();
    assert_eq!(
        query.text,
        "SELECT TOP 3 * FROM ROOT r WHERE r.tenant = @tenant_0 AND r.age > @age_1 ORDER BY r.age DESC"
    );
    assert_eq!(query.container, "persons_v2");
    assert_eq!(query.partition_key, Some(Value::from("acme")));
}

#[test]
fn declaration_defects_surface_at_registration() {
    let repo = open("");

    let cases = [
        ("findByNameAnd", QueryErrorKind::MalformedDescriptor),
        ("findByNickname", QueryErrorKind::UnknownProperty),
        ("findByNameFoo", QueryErrorKind::MalformedDescriptor),
    ];
    for (method, expected) in cases {
        let err: Error = repo
            .register(method, &[ArgShape::Scalar])
            .expect_err("declaration should fail")
            .into();
        assert_eq!(err.kind, ErrorKind::Query(expected), "{method}");
        assert!(err.is_declaration_defect());
    }
}

#[test]
fn continuation_token_is_handed_to_the_executor() {
    let executor = RecordingExecutor {
        next: ContinuationToken::from_bytes(*b"next"),
        ..RecordingExecutor::default()
    };
    let config = RepositoryConfig::default();
    let repo = open_repository(executor, person(), &config).expect("repository should open");
    let first = PageRequest::first(10).expect("page should build");

    let page = repo
        .find("findByActiveIsTrue", &[Arg::page(first)])
        .expect("first page should load");
    let next = page.next_request().expect("continuation should exist");
    repo.find("findByActiveIsTrue", &[Arg::page(next.clone())])
        .expect("second page should load");

    let query = repo.executor().last();
    assert_eq!(query.continuation, next.continuation().cloned());
    assert_eq!(query.page_size, Some(10));
    assert!(!query.text.contains("OFFSET"));
}

#[test]
fn page_identity_ignores_index() {
    let token = ContinuationToken::from_bytes(*b"abc");
    let a = PageRequest::new(0, 2).expect("page should build");
    let b = PageRequest::new(5, 2).expect("page should build");

    assert_eq!(a, b);
    assert_ne!(a.clone().with_continuation(token), a);
}

#[test]
fn public_error_survives_cbor_transport() {
    let repo = open("");
    let err: Error = repo
        .find("findByAgeNear", &[Arg::value(1)])
        .expect_err("near needs two arguments")
        .into();

    let bytes = serde_cbor::to_vec(&err).expect("error should serialize");
    let decoded: Error = serde_cbor::from_slice(&bytes).expect("error should deserialize");

    assert_eq!(decoded, err);
}

proptest! {
    #[test]
    fn rendered_placeholders_match_parameters(count in 1usize..6, use_or in any::<bool>()) {
        let repo = open("");
        let conj = if use_or { "Or" } else { "And" };
        let method = format!("findBy{}", vec!["Name"; count].join(conj));
        let args: Vec<Arg> = (0..count).map(|i| Arg::value(format!("v{i}"))).collect();

        repo.find(&method, &args).expect("query should run");

        let query = repo.executor().last();
        prop_assert_eq!(query.text.matches('?').count(), count);
        prop_assert_eq!(query.parameters.len(), count);
    }
}
