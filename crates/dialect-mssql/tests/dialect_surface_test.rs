use sluice_core::{
    ColumnDef, ColumnType, ConnectionParams, Dialect, EngineOptions, ErrorKind, IsolationLevel,
    TableModel, TableRef, Value, mapping,
};
use sluice_dialect_mssql::{MssqlDialect, SCHEMA_NAMES_QUERY, table_names_query};

#[test]
fn isolation_level_is_set_for_the_connection() {
    assert_eq!(
        MssqlDialect
            .isolation_statement(&IsolationLevel::new(IsolationLevel::SNAPSHOT))
            .as_deref(),
        Some("SET TRANSACTION ISOLATION LEVEL SNAPSHOT")
    );
}

#[test]
fn insert_uses_bracket_quoting_and_unicode_strings() {
    let sql = MssqlDialect
        .render_insert(
            &TableRef::parse("dbo.test_table"),
            &mapping! {
                "flag" => false,
                "payload" => vec![0xab_u8],
                "title" => "Ünïcode's",
            },
        )
        .expect("render insert");

    assert_eq!(
        sql,
        "INSERT INTO [dbo].[test_table] ([flag], [payload], [title]) VALUES (0, 0xAB, N'Ünïcode''s')"
    );
}

#[test]
fn brackets_inside_identifiers_are_escaped() {
    assert_eq!(MssqlDialect.quote_ident("odd]name"), "[odd]]name]");
}

#[test]
fn empty_binary_is_a_valid_literal() {
    assert_eq!(
        MssqlDialect
            .render_literal(&Value::Bytes(Vec::new()))
            .expect("empty bytes"),
        "0x"
    );
}

#[test]
fn integer_keys_use_identity_columns() {
    let model = TableModel::new("mocktable")
        .in_schema("dbo")
        .column(ColumnDef::new("id", ColumnType::Integer).primary_key())
        .column(ColumnDef::new("mock", ColumnType::String(256)).not_null())
        .column(ColumnDef::new("active", ColumnType::Boolean))
        .column(ColumnDef::new("notes", ColumnType::Text));

    assert_eq!(
        MssqlDialect.render_create_table(&model).expect("render"),
        "CREATE TABLE [dbo].[mocktable] ([id] INT IDENTITY(1,1) NOT NULL, \
         [mock] NVARCHAR(256) NOT NULL, [active] BIT, [notes] NVARCHAR(MAX), PRIMARY KEY ([id]))"
    );
}

#[test]
fn table_query_defaults_to_the_login_schema() {
    assert!(table_names_query(None).contains("= SCHEMA_NAME()"));
    assert!(table_names_query(Some("sales")).contains("= N'sales'"));
    assert!(table_names_query(Some("o'hara")).contains("= N'o''hara'"));
    assert!(SCHEMA_NAMES_QUERY.contains("sys.schemas"));
}

#[test]
fn unreachable_server_is_a_connection_error() {
    let params = ConnectionParams::new("app")
        .host("127.0.0.1")
        .port(1)
        .user("sa")
        .password("pw");

    let error = match MssqlDialect.connect(&params, &EngineOptions::default()) {
        Ok(_) => panic!("nothing listens on port 1"),
        Err(error) => error,
    };

    assert_eq!(error.kind(), ErrorKind::Connection);
}
