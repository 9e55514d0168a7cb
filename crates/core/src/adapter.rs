use crate::{Output, Result, Rows};

pub const BEGIN_SQL: &str = "BEGIN";
pub const COMMIT_SQL: &str = "COMMIT";
pub const ROLLBACK_SQL: &str = "ROLLBACK";

/// A single live connection to a backing store.
///
/// Methods take `&self`; adapters guard their client with a mutex so a
/// session can borrow the adapter while the owning [`crate::Database`] stays
/// readable.
pub trait DatabaseAdapter: Send {
    /// Runs `sql` and returns the number of affected rows when the backend
    /// reports one.
    fn execute(&self, sql: &str) -> Result<u64>;

    fn query(&self, sql: &str) -> Result<Rows>;

    /// Runs `sql` and keeps its result set when the statement produces one
    /// (`WITH`, `PRAGMA`, `RETURNING`, ...). Adapters that cannot tell report
    /// the affected count.
    fn run(&self, sql: &str) -> Result<Output> {
        self.execute(sql).map(Output::Affected)
    }

    /// Table names in `schema`, or in the connection's default schema.
    fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>>;

    fn schema_names(&self) -> Result<Vec<String>>;

    /// Runs connection-scoped statements (session settings, pragmas).
    fn execute_batch(&self, sql: &str) -> Result<()> {
        self.execute(sql).map(|_| ())
    }

    /// Metadata round trip used to validate a fresh connection.
    fn probe(&self) -> Result<()> {
        self.table_names(None).map(|_| ())
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

    /// Called exactly once when a session ends, whatever its outcome.
    fn release(&self) {}
}
