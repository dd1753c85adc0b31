use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn empty_document_yields_defaults() {
    let config = RepositoryConfig::from_toml_str("").expect("empty config should parse");

    assert_eq!(config, RepositoryConfig::default());
    assert!(config.descriptor_cache.enabled);
}

#[test]
fn full_document_overrides_every_field() {
    let source = r#"
dialect = "cosmos"
container = "people"
default_page_size = 25
max_page_size = 200
debug = true

[descriptor_cache]
enabled = false

[cursor]
max_token_bytes = 4096
"#;

    let config = RepositoryConfig::from_toml_str(source).expect("config should parse");

    assert_eq!(config.dialect, DialectName::Cosmos);
    assert_eq!(config.container.as_deref(), Some("people"));
    assert_eq!(config.default_page_size, 25);
    assert_eq!(config.max_page_size, 200);
    assert!(!config.descriptor_cache.enabled);
    assert_eq!(config.cursor.max_token_bytes, 4096);
    assert!(config.debug);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = RepositoryConfig::from_toml_str("page_size = 10").expect_err("typo should fail");

    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn unknown_dialect_is_rejected() {
    let err =
        RepositoryConfig::from_toml_str(r#"dialect = "oracle""#).expect_err("dialect should fail");

    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn validation_rejects_inconsistent_page_sizes() {
    let cases = [
        ("default_page_size = 0", "default_page_size"),
        ("default_page_size = 500\nmax_page_size = 100", "default_page_size"),
        ("max_page_size = 50000", "max_page_size"),
        ("[cursor]\nmax_token_bytes = 0", "cursor.max_token_bytes"),
        (r#"container = "  ""#, "container"),
    ];

    for (source, expected) in cases {
        let err = RepositoryConfig::from_toml_str(source).expect_err("config should be invalid");
        let ConfigError::Invalid { field, .. } = err else {
            panic!("expected Invalid for {source:?}, got {err:?}");
        };
        assert_eq!(field, expected, "{source}");
    }
}

#[test]
fn loads_from_file() {
    let mut file = NamedTempFile::new().expect("temp file should be created");
    file.write_all(b"dialect = \"cosmos\"\nmax_page_size = 50\ndefault_page_size = 10\n")
        .expect("temp file should be writable");

    let config = RepositoryConfig::from_path(file.path()).expect("file config should load");

    assert_eq!(config.dialect, DialectName::Cosmos);
    assert_eq!(config.max_page_size, 50);
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().expect("temp dir should be created");

    let err = RepositoryConfig::from_path(dir.path().join("absent.toml"))
        .expect_err("missing file should fail");

    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn serialized_config_parses_back() {
    let config = RepositoryConfig {
        dialect: DialectName::Cosmos,
        container: Some("orders".into()),
        ..RepositoryConfig::default()
    };

    let text = config.to_toml_string().expect("config should serialize");
    let parsed = RepositoryConfig::from_toml_str(&text).expect("serialized config should parse");

    assert_eq!(parsed, config);
}
