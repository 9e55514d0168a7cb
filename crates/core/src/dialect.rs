use crate::{
    Backend, ConnectionParams, DatabaseAdapter, EngineOptions, Error, IsolationLevel, Mapping,
    Result, TableModel, TableRef, Value,
};

pub trait Dialect: Send + Sync {
    fn backend(&self) -> Backend;

    fn connect(
        &self,
        params: &ConnectionParams,
        options: &EngineOptions,
    ) -> Result<Box<dyn DatabaseAdapter>>;

    fn quote_ident(&self, ident: &str) -> String;

    fn render_literal(&self, value: &Value) -> Result<String>;

    fn render_create_table(&self, model: &TableModel) -> Result<String>;

    /// Statement that applies `level` to the whole connection, if the backend
    /// has one.
    fn isolation_statement(&self, level: &IsolationLevel) -> Option<String>;

    fn name(&self) -> &'static str {
        self.backend().name()
    }

    fn render_create_schema(&self, schema: &str) -> String {
        format!("CREATE SCHEMA {}", self.quote_ident(schema))
    }

    fn render_table_name(&self, table: &TableRef) -> String {
        match table.schema() {
            Some(schema) => format!(
                "{}.{}",
                self.quote_ident(schema),
                self.quote_ident(&table.name)
            ),
            None => self.quote_ident(&table.name),
        }
    }

    fn render_insert(&self, table: &TableRef, data: &Mapping) -> Result<String> {
        if data.is_empty() {
            return Err(Error::Validation(format!(
                "insert into {table} requires at least one column"
            )));
        }

        let columns = data
            .keys()
            .map(|column| self.quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let values = data
            .values()
            .map(|value| self.render_literal(value))
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        Ok(format!(
            "INSERT INTO {} ({columns}) VALUES ({values})",
            self.render_table_name(table)
        ))
    }
}
