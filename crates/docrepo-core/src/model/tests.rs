use super::*;

fn person_schema() -> EntitySchema {
    EntitySchema::new("Person")
        .with_container("people")
        .with_properties(["name", "email", "address.city", "address.zip"])
        .with_partition_key("tenant")
}

#[test]
fn declared_and_parent_paths_resolve() {
    let schema = person_schema();

    assert!(schema.resolves(&"name".into()));
    assert!(schema.resolves(&"address.city".into()));
    assert!(schema.resolves(&"address".into()));
    assert!(schema.resolves(&"id".into()));
    assert!(schema.resolves(&"tenant".into()));
}

#[test]
fn unknown_and_malformed_paths_do_not_resolve() {
    let schema = person_schema();

    assert!(!schema.resolves(&"nickname".into()));
    assert!(!schema.resolves(&"addr".into()));
    assert!(!schema.resolves(&"address.".into()));
    assert!(!schema.resolves(&"".into()));
}

#[test]
fn prefix_check_respects_segment_boundaries() {
    let parent = PropertyPath::new("address");

    assert!(parent.is_prefix_of(&"address.city".into()));
    assert!(parent.is_prefix_of(&"address".into()));
    assert!(!parent.is_prefix_of(&"addressLine".into()));
}

#[test]
fn schema_exposes_container_and_partition_key() {
    let schema = person_schema();

    assert_eq!(schema.entity_name(), "Person");
    assert_eq!(schema.container(), "people");
    assert_eq!(schema.partition_key(), Some(&PropertyPath::new("tenant")));
}

#[test]
fn open_schema_accepts_any_well_formed_path() {
    let schema = OpenSchema::new("things");

    assert!(schema.resolves(&"anything.nested".into()));
    assert!(!schema.resolves(&"bad..path".into()));
    assert_eq!(schema.partition_key(), None);
}

#[test]
fn only_identifier_segments_are_well_formed() {
    for path in ["name", "address.city", "_id", "line2.zip_code"] {
        assert!(PropertyPath::new(path).is_well_formed(), "{path}");
    }

    for path in [
        "",
        "2fa",
        "x)OR(1=1",
        "name,(SELECT/**/1)",
        "a-b",
        "a.b c",
        "\u{e9}t\u{e9}",
    ] {
        assert!(!PropertyPath::new(path).is_well_formed(), "{path}");
        assert!(!OpenSchema::new("things").resolves(&path.into()), "{path}");
    }
}
