use std::{
    error::Error as StdError,
    io,
    sync::{Mutex, MutexGuard},
};

use futures_util::TryStreamExt;
use sluice_core::{
    ConnectionParams, DEFAULT_HOST, DEFAULT_MSSQL_PORT, DatabaseAdapter, Error, Output, Result,
    Row, Rows, Value,
};
use tiberius::{AuthMethod, Client, Column, ColumnData, Config, QueryItem};
use tokio::{
    net::TcpStream,
    runtime::{Builder, Runtime},
};
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use crate::metadata_queries::{SCHEMA_NAMES_QUERY, table_names_query};

type TdsClient = Client<Compat<TcpStream>>;

const BACKEND: &str = "mssql";
// Transaction control goes through plain batches: `sp_executesql` would undo
// a transaction opened inside it when the call returns.
const BEGIN_SQL: &str = "BEGIN TRANSACTION";
const COMMIT_SQL: &str = "COMMIT TRANSACTION";
const ROLLBACK_SQL: &str = "ROLLBACK TRANSACTION";
const POISONED_CONNECTION_MESSAGE: &str = "mssql connection state was poisoned";
const ROW_COUNT_TRAILER: &str = ";SELECT CAST(@@ROWCOUNT AS BIGINT) AS affected";

pub(crate) struct MssqlAdapter {
    state: Box<Mutex<LiveState>>,
}

struct LiveState {
    runtime: Runtime,
    client: TdsClient,
}

pub(crate) fn connect(params: &ConnectionParams) -> Result<Box<dyn DatabaseAdapter>> {
    let state = connect_live_state(params)?;
    Ok(Box::new(MssqlAdapter {
        state: Box::new(Mutex::new(state)),
    }))
}

impl MssqlAdapter {
    fn lock_state(&self, sql: &str) -> Result<MutexGuard<'_, LiveState>> {
        self.state
            .lock()
            .map_err(|_| execution_error(sql, io::Error::other(POISONED_CONNECTION_MESSAGE)))
    }
}

impl DatabaseAdapter for MssqlAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let mut state = self.lock_state(sql)?;
        let LiveState { runtime, client } = &mut *state;

        runtime.block_on(async {
            let result = client
                .execute(sql, &[])
                .await
                .map_err(|source| execution_error(sql, source))?;
            Ok(result.total())
        })
    }

    fn query(&self, sql: &str) -> Result<Rows> {
        let mut state = self.lock_state(sql)?;
        query_rows(&mut state, sql)
    }

    fn run(&self, sql: &str) -> Result<Output> {
        let mut state = self.lock_state(sql)?;
        run_live_sql(&mut state, sql)
    }

    fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let query = table_names_query(schema);
        let mut state = self.lock_state(&query)?;
        query_strings(&mut state, &query)
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        let mut state = self.lock_state(SCHEMA_NAMES_QUERY)?;
        query_strings(&mut state, SCHEMA_NAMES_QUERY)
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        let mut state = self.lock_state(sql)?;
        execute_live_sql(&mut state, sql)
    }

    fn begin(&self) -> Result<()> {
        self.execute_batch(BEGIN_SQL)
    }

    fn commit(&self) -> Result<()> {
        self.execute_batch(COMMIT_SQL)
    }

    fn rollback(&self) -> Result<()> {
        self.execute_batch(ROLLBACK_SQL)
    }
}

fn connect_live_state(params: &ConnectionParams) -> Result<LiveState> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| Error::connection(BACKEND, source))?;
    let tds_config = build_tiberius_config(params);

    debug!(
        addr = %tds_config.get_addr(),
        database = %params.database,
        "connecting to mssql"
    );

    let client = runtime.block_on(async {
        let tcp = TcpStream::connect(tds_config.get_addr())
            .await
            .map_err(|source| Error::connection(BACKEND, source))?;
        tcp.set_nodelay(true)
            .map_err(|source| Error::connection(BACKEND, source))?;

        Client::connect(tds_config, tcp.compat_write())
            .await
            .map_err(|source| Error::connection(BACKEND, source))
    })?;

    Ok(LiveState { runtime, client })
}

fn build_tiberius_config(params: &ConnectionParams) -> Config {
    let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = params.port.unwrap_or(DEFAULT_MSSQL_PORT);
    let user = params.user.clone().unwrap_or_default();
    let password = params.password.clone().unwrap_or_default();

    let mut tds_config = Config::new();
    tds_config.host(host);
    tds_config.port(port);
    tds_config.database(params.database.clone());
    tds_config.authentication(AuthMethod::sql_server(user, password));
    tds_config.trust_cert();

    tds_config
}

fn execute_live_sql(state: &mut LiveState, sql: &str) -> Result<()> {
    let LiveState { runtime, client } = state;

    runtime.block_on(async {
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|source| execution_error(sql, source))?;
        while stream
            .try_next()
            .await
            .map_err(|source| execution_error(sql, source))?
            .is_some()
        {}
        Ok(())
    })
}

/// Rows of the first result set.
fn query_rows(state: &mut LiveState, sql: &str) -> Result<Rows> {
    let mut result_sets = collect_result_sets(state, sql)?;
    if result_sets.is_empty() {
        return Ok(Rows::default());
    }
    Ok(result_sets.swap_remove(0))
}

/// Runs `sql` followed by a row-count trailer. A second result set means the
/// statement produced rows of its own.
fn run_live_sql(state: &mut LiveState, sql: &str) -> Result<Output> {
    let batch = format!("{sql}\n{ROW_COUNT_TRAILER}");
    let mut result_sets = collect_result_sets(state, &batch)?;

    if result_sets.len() > 1 {
        return Ok(Output::Rows(result_sets.swap_remove(0)));
    }

    let affected = result_sets
        .pop()
        .and_then(|rows| rows.rows.into_iter().next())
        .and_then(|row| row.into_iter().next())
        .and_then(|value| match value {
            Value::Integer(count) => u64::try_from(count).ok(),
            _ => None,
        })
        .unwrap_or_default();

    Ok(Output::Affected(affected))
}

fn collect_result_sets(state: &mut LiveState, sql: &str) -> Result<Vec<Rows>> {
    let LiveState { runtime, client } = state;

    runtime.block_on(async {
        let mut stream = client
            .simple_query(sql)
            .await
            .map_err(|source| execution_error(sql, source))?;
        let mut result_sets: Vec<Rows> = Vec::new();

        while let Some(item) = stream
            .try_next()
            .await
            .map_err(|source| execution_error(sql, source))?
        {
            match item {
                QueryItem::Metadata(metadata) => {
                    result_sets.push(Rows {
                        columns: metadata
                            .columns()
                            .iter()
                            .map(|column| column.name().to_string())
                            .collect(),
                        rows: Vec::new(),
                    });
                }
                QueryItem::Row(row) => {
                    let decoded = row
                        .cells()
                        .map(|(column, data)| decode_value(column, data))
                        .collect::<Result<Row>>()?;
                    if let Some(current) = result_sets.last_mut() {
                        current.rows.push(decoded);
                    }
                }
            }
        }

        Ok(result_sets)
    })
}

fn query_strings(state: &mut LiveState, sql: &str) -> Result<Vec<String>> {
    let rows = query_rows(state, sql)?;

    Ok(rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|value| match value {
            Value::Text(value) => Some(value),
            _ => None,
        })
        .collect())
}

fn decode_value(column: &Column, data: &ColumnData<'_>) -> Result<Value> {
    let value = match data {
        ColumnData::U8(value) => Value::from(value.map(i64::from)),
        ColumnData::I16(value) => Value::from(value.map(i64::from)),
        ColumnData::I32(value) => Value::from(*value),
        ColumnData::I64(value) => Value::from(*value),
        ColumnData::F32(value) => Value::from(value.map(f64::from)),
        ColumnData::F64(value) => Value::from(*value),
        ColumnData::Bit(value) => Value::from(*value),
        ColumnData::String(value) => Value::from(value.as_deref().map(str::to_string)),
        ColumnData::Binary(value) => Value::from(value.as_deref().map(<[u8]>::to_vec)),
        ColumnData::Guid(value) => Value::from(value.as_ref().map(ToString::to_string)),
        ColumnData::Numeric(value) => Value::from(value.as_ref().map(ToString::to_string)),
        _ => {
            return Err(Error::UnsupportedType(format!(
                "column `{}` has an mssql type ({:?}) with no value mapping",
                column.name(),
                column.column_type()
            )));
        }
    };

    Ok(value)
}

fn execution_error<E>(sql: &str, source: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    Error::execution(sql, source)
}
