use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use postgres::{
    Client, NoTls, Row, SimpleQueryMessage,
    types::{FromSql, Type},
};
use sluice_core::{
    ConnectionParams, DEFAULT_HOST, DEFAULT_POSTGRES_PORT, DatabaseAdapter, Error, Output, Result,
    Rows, Value,
};
use tracing::debug;

use crate::metadata_queries::{SCHEMA_NAMES_QUERY, TABLE_NAMES_QUERY};

const BACKEND: &str = "postgres";
const POISONED_CLIENT_MESSAGE: &str = "postgres connection state was poisoned";

pub(crate) struct PostgresAdapter {
    client: Mutex<Client>,
}

pub(crate) fn connect(params: &ConnectionParams) -> Result<Box<dyn DatabaseAdapter>> {
    let client = connect_client(params)?;
    Ok(Box::new(PostgresAdapter {
        client: Mutex::new(client),
    }))
}

impl PostgresAdapter {
    fn lock_client(&self, sql: &str) -> Result<MutexGuard<'_, Client>> {
        self.client
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CLIENT_MESSAGE)))
    }
}

impl DatabaseAdapter for PostgresAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let mut client = self.lock_client(sql)?;
        let messages = client
            .simple_query(sql)
            .map_err(|source| execution_error(sql, source))?;

        Ok(messages
            .iter()
            .map(|message| match message {
                SimpleQueryMessage::CommandComplete(count) => *count,
                _ => 0,
            })
            .sum())
    }

    fn query(&self, sql: &str) -> Result<Rows> {
        let mut client = self.lock_client(sql)?;
        let statement = client
            .prepare(sql)
            .map_err(|source| execution_error(sql, source))?;
        let columns = statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect::<Vec<_>>();

        let rows = client
            .query(&statement, &[])
            .map_err(|source| execution_error(sql, source))?;

        let rows = rows
            .iter()
            .map(|row| decode_row(row, sql))
            .collect::<Result<Vec<_>>>()?;

        Ok(Rows { columns, rows })
    }

    /// Uses the simple query protocol, so result columns come back as text.
    fn run(&self, sql: &str) -> Result<Output> {
        let mut client = self.lock_client(sql)?;
        let messages = client
            .simple_query(sql)
            .map_err(|source| execution_error(sql, source))?;

        Ok(collect_output(messages))
    }

    fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let mut client = self.lock_client(TABLE_NAMES_QUERY)?;
        let rows = client
            .query(TABLE_NAMES_QUERY, &[&schema])
            .map_err(|source| execution_error(TABLE_NAMES_QUERY, source))?;
        rows.iter()
            .map(|row| first_string(row, TABLE_NAMES_QUERY))
            .collect()
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        let mut client = self.lock_client(SCHEMA_NAMES_QUERY)?;
        let rows = client
            .query(SCHEMA_NAMES_QUERY, &[])
            .map_err(|source| execution_error(SCHEMA_NAMES_QUERY, source))?;
        rows.iter()
            .map(|row| first_string(row, SCHEMA_NAMES_QUERY))
            .collect()
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut client = self.lock_client(sql)?;
        client
            .batch_execute(sql)
            .map_err(|source| execution_error(sql, source))
    }
}

fn connect_client(params: &ConnectionParams) -> Result<Client> {
    let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = params.port.unwrap_or(DEFAULT_POSTGRES_PORT);

    let mut postgres_config = postgres::Config::new();
    postgres_config.host(host).port(port).dbname(&params.database);
    if let Some(user) = &params.user {
        postgres_config.user(user);
    }
    if let Some(password) = &params.password {
        postgres_config.password(password);
    }

    debug!(host, port, database = %params.database, "connecting to postgres");

    postgres_config
        .connect(NoTls)
        .map_err(|source| Error::connection(BACKEND, source))
}

/// The first result set wins; without one, the summed command counts.
fn collect_output(messages: Vec<SimpleQueryMessage>) -> Output {
    let mut result: Option<Rows> = None;
    let mut described = 0_usize;
    let mut affected = 0_u64;

    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                described += 1;
                if described == 1 {
                    result = Some(Rows {
                        columns: columns
                            .iter()
                            .map(|column| column.name().to_string())
                            .collect(),
                        rows: Vec::new(),
                    });
                }
            }
            SimpleQueryMessage::Row(row) if described == 1 => {
                if let Some(rows) = result.as_mut() {
                    rows.rows.push(
                        (0..row.len())
                            .map(|index| Value::from(row.get(index).map(str::to_string)))
                            .collect(),
                    );
                }
            }
            SimpleQueryMessage::CommandComplete(count) => affected += count,
            _ => {}
        }
    }

    result.map_or(Output::Affected(affected), Output::Rows)
}

fn first_string(row: &Row, sql: &str) -> Result<String> {
    row.try_get::<_, String>(0)
        .map_err(|source| execution_error(sql, source))
}

fn decode_row(row: &Row, sql: &str) -> Result<Vec<Value>> {
    row.columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let value = decode_value(row, index, column.type_())
                .map_err(|source| execution_error(sql, source))?;
            value.ok_or_else(|| {
                Error::UnsupportedType(format!(
                    "column `{}` has postgres type `{}` which has no value mapping",
                    column.name(),
                    column.type_()
                ))
            })
        })
        .collect()
}

/// `Ok(None)` means the column type has no [`Value`] mapping.
fn decode_value(
    row: &Row,
    index: usize,
    column_type: &Type,
) -> std::result::Result<Option<Value>, postgres::Error> {
    let value = if *column_type == Type::BOOL {
        Value::from(row.try_get::<_, Option<bool>>(index)?)
    } else if *column_type == Type::INT2 {
        Value::from(row.try_get::<_, Option<i16>>(index)?.map(i64::from))
    } else if *column_type == Type::INT4 {
        Value::from(row.try_get::<_, Option<i32>>(index)?)
    } else if *column_type == Type::INT8 {
        Value::from(row.try_get::<_, Option<i64>>(index)?)
    } else if *column_type == Type::OID {
        Value::from(row.try_get::<_, Option<u32>>(index)?.map(i64::from))
    } else if *column_type == Type::FLOAT4 {
        Value::from(row.try_get::<_, Option<f32>>(index)?.map(f64::from))
    } else if *column_type == Type::FLOAT8 {
        Value::from(row.try_get::<_, Option<f64>>(index)?)
    } else if *column_type == Type::BYTEA {
        Value::from(row.try_get::<_, Option<Vec<u8>>>(index)?)
    } else if <String as FromSql<'_>>::accepts(column_type) {
        Value::from(row.try_get::<_, Option<String>>(index)?)
    } else {
        return Ok(None);
    };

    Ok(Some(value))
}

fn execution_error<E>(sql: &str, source: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error::execution(sql, source)
}
