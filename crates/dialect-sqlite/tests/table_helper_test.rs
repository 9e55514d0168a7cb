use sluice_core::{ColumnDef, ColumnType, ErrorKind, TableModel, Value, mapping};

#[path = "support/sqlite_fixture.rs"]
mod sqlite_fixture;

use sqlite_fixture::{open_in_memory, select_all, test_model};

#[test]
fn model_insert_creates_table_and_assigns_first_id() {
    let mut database = open_in_memory();
    assert!(!database.table_exists("test", None).expect("lookup"));

    database
        .insert_from_mapping(test_model(), &mapping! { "name" => "a" })
        .expect("model insert should succeed");

    assert!(database.table_exists("test", None).expect("lookup"));
    assert_eq!(
        select_all(&database, "SELECT id, name FROM test"),
        vec![vec![Value::Integer(1), Value::Text("a".to_string())]]
    );
}

#[test]
fn autoincrement_keeps_counting_across_inserts() {
    let mut database = open_in_memory();

    for name in ["a", "b", "c"] {
        database
            .insert_from_mapping(test_model(), &mapping! { "name" => name })
            .expect("insert");
    }

    assert_eq!(
        select_all(&database, "SELECT id FROM test ORDER BY id"),
        vec![
            vec![Value::Integer(1)],
            vec![Value::Integer(2)],
            vec![Value::Integer(3)],
        ]
    );
}

#[test]
fn insert_into_missing_table_without_model_is_not_found() {
    let mut database = open_in_memory();

    let error = database
        .insert_from_mapping("nonexistent_table", &mapping! { "mock" => "foobar" })
        .expect_err("missing table must be rejected");

    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.to_string(), "nonexistent_table does not exist!");
}

#[test]
fn qualified_name_targets_attached_schema() {
    let mut database = open_in_memory();
    database
        .execute("CREATE TABLE main.metrics (name TEXT, value REAL)")
        .expect("create table");

    database
        .insert_from_mapping("main.metrics", &mapping! { "name" => "cpu", "value" => 0.5 })
        .expect("qualified insert");

    assert_eq!(
        select_all(&database, "SELECT name, value FROM metrics"),
        vec![vec![Value::Text("cpu".to_string()), Value::Real(0.5)]]
    );
}

#[test]
fn create_tables_builds_every_registered_model() {
    let mut database = open_in_memory();
    database.register_model(test_model());
    database.register_model(
        TableModel::new("blobs")
            .column(ColumnDef::new("slug", ColumnType::String(32)).primary_key())
            .column(ColumnDef::new("payload", ColumnType::Bytes))
            .column(ColumnDef::new("flag", ColumnType::Boolean)),
    );

    database.create_tables().expect("create tables");
    database.create_tables().expect("second call is a no-op");

    assert!(database.table_exists("test", None).expect("lookup"));
    assert!(database.table_exists("blobs", None).expect("lookup"));

    database
        .insert_from_mapping(
            "blobs",
            &mapping! { "slug" => "k", "payload" => vec![1_u8, 2], "flag" => true },
        )
        .expect("insert bytes and bool");
    assert_eq!(
        select_all(&database, "SELECT slug, payload, flag FROM blobs"),
        vec![vec![
            Value::Text("k".to_string()),
            Value::Bytes(vec![1, 2]),
            Value::Integer(1),
        ]]
    );
}

#[test]
fn quotes_in_values_are_escaped() {
    let mut database = open_in_memory();

    database
        .insert_from_mapping(test_model(), &mapping! { "name" => "O'Brien" })
        .expect("insert");

    assert_eq!(
        select_all(&database, "SELECT name FROM test"),
        vec![vec![Value::Text("O'Brien".to_string())]]
    );
}
