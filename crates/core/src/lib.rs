mod adapter;
mod backend;
mod config;
mod database;
mod dialect;
mod error;
pub mod literal;
mod model;
mod retry;
mod session;
mod value;

pub use adapter::{BEGIN_SQL, COMMIT_SQL, DatabaseAdapter, ROLLBACK_SQL};
pub use backend::{
    Backend, DEFAULT_HOST, DEFAULT_MSSQL_PORT, DEFAULT_POSTGRES_PORT, IN_MEMORY_DATABASE,
    MSSQL_ODBC_DRIVER, connection_string,
};
pub use config::{
    ConnectionParams, ECHO_ENV, EngineOptions, IsolationLevel, MAX_OVERFLOW_ENV, POOL_SIZE_ENV,
};
pub use database::Database;
pub use dialect::Dialect;
pub use error::{BoxError, Error, ErrorKind, Result};
pub use model::{ColumnDef, ColumnType, InsertTarget, Metadata, TableModel, TableRef};
pub use retry::{BASE_RETRY_DELAY, MAX_CONNECT_ATTEMPTS, RetryPolicy, Sleeper, connect_with_retry};
pub use session::{Session, SessionState};
pub use value::{Mapping, Output, Row, Rows, Value};

/// Builds a [`Mapping`] from `column => value` pairs.
#[macro_export]
macro_rules! mapping {
    ($($column:expr => $value:expr),* $(,)?) => {{
        let mut mapping = $crate::Mapping::new();
        $(mapping.insert(::std::string::String::from($column), $crate::Value::from($value));)*
        mapping
    }};
}

#[cfg(test)]
mod tests {
    use super::{TableRef, mapping};

    #[test]
    fn table_ref_parse_splits_only_on_a_single_dot() {
        assert_eq!(TableRef::parse("dbo.users"), TableRef::qualified("dbo", "users"));
        assert_eq!(TableRef::parse("users"), TableRef::new("users"));
        assert_eq!(TableRef::parse("a.b.c"), TableRef::new("a.b.c"));
    }

    #[test]
    fn mapping_macro_orders_columns() {
        let data = mapping! { "name" => "a", "age" => 3 };
        assert_eq!(data.keys().cloned().collect::<Vec<_>>(), ["age", "name"]);
    }
}
