mod adapter;
mod metadata_queries;
mod to_sql;

use sluice_core::{
    Backend, ConnectionParams, DatabaseAdapter, Dialect, EngineOptions, IsolationLevel, Result,
    TableModel, Value,
};

pub use metadata_queries::{schema_names_query, table_names_query};

const READ_UNCOMMITTED_PRAGMA: &str = "PRAGMA read_uncommitted = true";

/// Embedded single-file backend. An empty database name or `:memory:` opens
/// a private in-memory database.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn connect(
        &self,
        params: &ConnectionParams,
        _options: &EngineOptions,
    ) -> Result<Box<dyn DatabaseAdapter>> {
        adapter::connect(params)
    }

    fn quote_ident(&self, ident: &str) -> String {
        to_sql::quote_ident(ident)
    }

    fn render_literal(&self, value: &Value) -> Result<String> {
        to_sql::render_literal(value)
    }

    fn render_create_table(&self, model: &TableModel) -> Result<String> {
        to_sql::render_create_table(model)
    }

    fn isolation_statement(&self, level: &IsolationLevel) -> Option<String> {
        level
            .is(IsolationLevel::READ_UNCOMMITTED)
            .then(|| READ_UNCOMMITTED_PRAGMA.to_string())
    }
}
