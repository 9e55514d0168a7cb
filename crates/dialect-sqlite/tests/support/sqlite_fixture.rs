use std::path::Path;

use sluice_core::{
    ColumnDef, ColumnType, ConnectionParams, Database, EngineOptions, RetryPolicy, TableModel,
    Value,
};
use sluice_dialect_sqlite::SqliteDialect;

pub fn open_in_memory() -> Database {
    open_params(ConnectionParams::new(":memory:"))
}

#[allow(dead_code)]
pub fn open_file(path: &Path) -> Database {
    open_params(ConnectionParams::new(path.to_string_lossy()))
}

pub fn open_params(params: ConnectionParams) -> Database {
    Database::connect_with(
        SqliteDialect,
        params,
        EngineOptions::default(),
        &RetryPolicy::default(),
    )
    .expect("sqlite connect should succeed")
}

#[allow(dead_code)]
pub fn test_model() -> TableModel {
    TableModel::new("test")
        .column(ColumnDef::new("id", ColumnType::Integer).primary_key())
        .column(ColumnDef::new("name", ColumnType::Text).not_null())
}

#[allow(dead_code)]
pub fn select_all(database: &Database, sql: &str) -> Vec<Vec<Value>> {
    database
        .query(sql)
        .expect("select should succeed")
        .into_iter()
        .collect()
}
