use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use rusqlite::{Connection, types::ValueRef};
use sluice_core::{
    ConnectionParams, DatabaseAdapter, Error, IN_MEMORY_DATABASE, Output, Result, Row, Rows,
    Value,
};
use tracing::debug;

use crate::metadata_queries::{self, SCHEMA_NAMES_QUERY};

const BACKEND: &str = "sqlite";
const POISONED_CONNECTION_MESSAGE: &str = "sqlite connection state was poisoned";

pub(crate) struct SqliteAdapter {
    connection: Mutex<Connection>,
}

pub(crate) fn connect(params: &ConnectionParams) -> Result<Box<dyn DatabaseAdapter>> {
    let path = params.database.trim();
    let connection = if path.is_empty() || path == IN_MEMORY_DATABASE {
        Connection::open_in_memory()
    } else {
        Connection::open(path)
    }
    .map_err(|source| Error::connection(BACKEND, source))?;

    debug!(path, "opened sqlite database");

    Ok(Box::new(SqliteAdapter {
        connection: Mutex::new(connection),
    }))
}

impl SqliteAdapter {
    fn lock_connection(&self, sql: &str) -> Result<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CONNECTION_MESSAGE)))
    }
}

impl DatabaseAdapter for SqliteAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let connection = self.lock_connection(sql)?;
        execute_counted(&connection, sql)
    }

    fn query(&self, sql: &str) -> Result<Rows> {
        let connection = self.lock_connection(sql)?;
        query_rows(&connection, sql)
    }

    fn run(&self, sql: &str) -> Result<Output> {
        let connection = self.lock_connection(sql)?;
        // Scripts fail to prepare as one statement and go through the batch path.
        let yields_rows = connection
            .prepare(sql)
            .is_ok_and(|statement| statement.column_count() > 0);

        if yields_rows {
            query_rows(&connection, sql).map(Output::Rows)
        } else {
            execute_counted(&connection, sql).map(Output::Affected)
        }
    }

    fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let query = metadata_queries::table_names_query(schema);
        let connection = self.lock_connection(&query)?;
        query_string_column(&connection, &query, 0)
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        let connection = self.lock_connection(SCHEMA_NAMES_QUERY)?;
        // database_list columns: seq, name, file
        query_string_column(&connection, SCHEMA_NAMES_QUERY, 1)
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        let connection = self.lock_connection(sql)?;
        connection
            .execute_batch(sql)
            .map_err(|source| execution_error(sql, source))
    }
}

fn execute_counted(connection: &Connection, sql: &str) -> Result<u64> {
    let before = connection.total_changes();
    connection
        .execute_batch(sql)
        .map_err(|source| execution_error(sql, source))?;
    let changed = connection.total_changes().saturating_sub(before);

    Ok(u64::try_from(changed).unwrap_or(u64::MAX))
}

fn query_rows(connection: &Connection, sql: &str) -> Result<Rows> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|source| execution_error(sql, source))?;
    let columns = statement
        .column_names()
        .into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let width = columns.len();

    let mut rows = statement
        .query([])
        .map_err(|source| execution_error(sql, source))?;

    let mut values = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|source| execution_error(sql, source))?
    {
        let mut decoded: Row = Vec::with_capacity(width);
        for index in 0..width {
            let value = row
                .get_ref(index)
                .map_err(|source| execution_error(sql, source))?;
            decoded.push(decode_value(value));
        }
        values.push(decoded);
    }

    Ok(Rows {
        columns,
        rows: values,
    })
}

fn query_string_column(connection: &Connection, query: &str, index: usize) -> Result<Vec<String>> {
    let mut statement = connection
        .prepare(query)
        .map_err(|source| execution_error(query, source))?;
    let mut rows = statement
        .query([])
        .map_err(|source| execution_error(query, source))?;

    let mut values = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|source| execution_error(query, source))?
    {
        values.push(
            row.get::<_, String>(index)
                .map_err(|source| execution_error(query, source))?,
        );
    }

    Ok(values)
}

fn decode_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(value) => Value::Integer(value),
        ValueRef::Real(value) => Value::Real(value),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Bytes(bytes.to_vec()),
    }
}

fn execution_error<E>(sql: &str, source: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error::execution(sql, source)
}
