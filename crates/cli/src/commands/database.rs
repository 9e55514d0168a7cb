use clap::{Args, Subcommand};
use sluice_core::{
    ConnectionParams, Database, Dialect, EngineOptions, MAX_CONNECT_ATTEMPTS, Mapping, Output,
    RetryPolicy, Rows, Value, connection_string,
};
use tracing::debug;

use crate::error_presentation::{CliError, CliResult};

#[derive(Args, Debug)]
pub(crate) struct ConnectArgs {
    /// Connection attempts before giving up
    #[arg(long, value_name = "N", default_value_t = MAX_CONNECT_ATTEMPTS)]
    connect_attempts: u32,
}

#[cfg(feature = "sqlite")]
#[derive(Args, Debug)]
pub(crate) struct SqliteArgs {
    /// Database file, or `:memory:`
    database: String,

    #[command(flatten)]
    connect: ConnectArgs,

    #[command(subcommand)]
    action: DatabaseAction,
}

#[cfg(feature = "sqlite")]
impl SqliteArgs {
    pub(crate) fn into_parts(self) -> (ConnectionParams, ConnectArgs, DatabaseAction) {
        (ConnectionParams::new(self.database), self.connect, self.action)
    }
}

#[cfg(any(feature = "postgres", feature = "mssql"))]
#[derive(Args, Debug)]
pub(crate) struct ServerArgs {
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    port: Option<u16>,

    #[arg(long, short = 'u')]
    user: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Session isolation level, e.g. "READ COMMITTED"
    #[arg(long, value_name = "LEVEL")]
    isolation_level: Option<String>,

    database: String,

    #[command(flatten)]
    connect: ConnectArgs,

    #[command(subcommand)]
    action: DatabaseAction,
}

#[cfg(any(feature = "postgres", feature = "mssql"))]
impl ServerArgs {
    pub(crate) fn into_parts(self) -> (ConnectionParams, ConnectArgs, DatabaseAction) {
        let mut params = ConnectionParams::new(self.database);
        if let Some(host) = self.host {
            params = params.host(host);
        }
        if let Some(port) = self.port {
            params = params.port(port);
        }
        if let Some(user) = self.user {
            params = params.user(user);
        }
        if let Some(password) = self.password {
            params = params.password(password);
        }
        if let Some(level) = self.isolation_level {
            params = params.isolation_level(level);
        }
        (params, self.connect, self.action)
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum DatabaseAction {
    /// Run one statement; `select` statements print their rows
    Exec { sql: String },
    /// Print whether a table exists
    TableExists {
        table: String,
        #[arg(long)]
        schema: Option<String>,
    },
    /// Insert one row into an existing table
    Insert {
        /// Table name, optionally `schema.table`
        table: String,
        #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
        values: Vec<String>,
    },
    /// Print the connection string without connecting
    Url,
}

pub(crate) fn run_database<D>(
    dialect: D,
    params: ConnectionParams,
    connect: &ConnectArgs,
    action: DatabaseAction,
) -> CliResult<()>
where
    D: Dialect + 'static,
{
    match action {
        DatabaseAction::Url => {
            println!("{}", connection_string(dialect.backend(), &params));
        }
        DatabaseAction::Exec { sql } => {
            let mut database = open(dialect, params, connect)?;
            match database.execute(&sql)? {
                Output::Rows(rows) => print_rows(&rows),
                Output::Affected(count) => println!("{count} row(s) affected"),
            }
        }
        DatabaseAction::TableExists { table, schema } => {
            let database = open(dialect, params, connect)?;
            println!("{}", database.table_exists(&table, schema.as_deref())?);
        }
        DatabaseAction::Insert { table, values } => {
            let mapping = parse_assignments(&values)?;
            let mut database = open(dialect, params, connect)?;
            database.insert_from_mapping(table.as_str(), &mapping)?;
            println!("inserted 1 row into {table}");
        }
    }

    Ok(())
}

fn open<D>(dialect: D, params: ConnectionParams, connect: &ConnectArgs) -> CliResult<Database>
where
    D: Dialect + 'static,
{
    let options = EngineOptions::from_env()?;
    let policy = RetryPolicy::default().with_max_attempts(connect.connect_attempts);
    debug!(attempts = policy.max_attempts(), "opening database");
    Ok(Database::connect_with(dialect, params, options, &policy)?)
}

fn print_rows(rows: &Rows) {
    println!("{}", rows.columns.join("\t"));
    for row in rows.iter() {
        let cells = row.iter().map(ToString::to_string).collect::<Vec<_>>();
        println!("{}", cells.join("\t"));
    }
}

fn parse_assignments(assignments: &[String]) -> CliResult<Mapping> {
    let mut mapping = Mapping::new();
    for assignment in assignments {
        match assignment.split_once('=') {
            Some((column, raw)) if !column.is_empty() => {
                mapping.insert(column.to_string(), parse_value(raw));
            }
            _ => {
                return Err(CliError::InvalidArgument(format!(
                    "expected COLUMN=VALUE, got `{assignment}`"
                )));
            }
        }
    }
    Ok(mapping)
}

/// JSON scalars keep their type; anything else is stored as text.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Null) => Value::Null,
        Ok(serde_json::Value::Bool(value)) => Value::Bool(value),
        Ok(serde_json::Value::Number(number)) => number
            .as_i64()
            .map(Value::Integer)
            .or_else(|| number.as_f64().map(Value::Real))
            .unwrap_or_else(|| Value::Text(raw.to_string())),
        Ok(serde_json::Value::String(value)) => Value::Text(value),
        _ => Value::Text(raw.to_string()),
    }
}
