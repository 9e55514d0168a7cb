mod adapter;
mod metadata_queries;
mod to_sql;

use sluice_core::{
    Backend, ConnectionParams, DatabaseAdapter, Dialect, EngineOptions, IsolationLevel, Result,
    TableModel, Value,
};

pub use metadata_queries::{SCHEMA_NAMES_QUERY, TABLE_NAMES_QUERY};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn backend(&self) -> Backend {
        Backend::Postgres
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
        Some(format!(
            "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL {level}"
        ))
    }
}
