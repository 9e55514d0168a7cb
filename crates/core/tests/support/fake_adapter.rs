use std::{
    collections::BTreeSet,
    error::Error as StdError,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use sluice_core::{
    BEGIN_SQL, COMMIT_SQL, DatabaseAdapter, Error, ROLLBACK_SQL, Result, Row, Rows, Value,
};

#[derive(Debug, Default)]
struct FailureRule {
    sql: String,
    message: String,
}

#[derive(Debug, Default)]
pub struct FakeAdapterState {
    executed_sql: Vec<String>,
    tables: BTreeSet<(Option<String>, String)>,
    schemas: BTreeSet<String>,
    query_rows: Vec<Row>,
    begin_count: usize,
    commit_count: usize,
    rollback_count: usize,
    release_count: usize,
    fail_on_sql: Option<FailureRule>,
}

/// Shared view of the state behind every adapter a `FakeDialect` hands out.
#[derive(Debug, Clone, Default)]
pub struct FakeAdapterHandle {
    state: Arc<Mutex<FakeAdapterState>>,
}

#[allow(dead_code)]
impl FakeAdapterHandle {
    fn lock(&self) -> MutexGuard<'_, FakeAdapterState> {
        self.state.lock().expect("fake adapter state lock")
    }

    pub fn adapter(&self) -> FakeAdapter {
        FakeAdapter {
            state: Arc::clone(&self.state),
        }
    }

    pub fn add_table(&self, schema: Option<&str>, name: &str) {
        self.lock()
            .tables
            .insert((schema.map(ToString::to_string), name.to_string()));
    }

    pub fn add_schema(&self, schema: &str) {
        self.lock().schemas.insert(schema.to_string());
    }

    pub fn set_query_rows(&self, rows: Vec<Row>) {
        self.lock().query_rows = rows;
    }

    pub fn set_fail_on_sql(&self, sql: impl Into<String>, message: impl Into<String>) {
        self.lock().fail_on_sql = Some(FailureRule {
            sql: sql.into(),
            message: message.into(),
        });
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.lock().executed_sql.clone()
    }

    pub fn has_table(&self, schema: Option<&str>, name: &str) -> bool {
        self.lock()
            .tables
            .contains(&(schema.map(ToString::to_string), name.to_string()))
    }

    pub fn has_schema(&self, schema: &str) -> bool {
        self.lock().schemas.contains(schema)
    }

    pub fn begin_count(&self) -> usize {
        self.lock().begin_count
    }

    pub fn commit_count(&self) -> usize {
        self.lock().commit_count
    }

    pub fn rollback_count(&self) -> usize {
        self.lock().rollback_count
    }

    pub fn release_count(&self) -> usize {
        self.lock().release_count
    }
}

#[derive(Debug)]
pub struct FakeAdapter {
    state: Arc<Mutex<FakeAdapterState>>,
}

impl FakeAdapter {
    fn lock(&self) -> MutexGuard<'_, FakeAdapterState> {
        self.state.lock().expect("fake adapter state lock")
    }
}

impl DatabaseAdapter for FakeAdapter {
    fn execute(&self, sql: &str) -> Result<u64> {
        let mut state = self.lock();

        if let Some(rule) = &state.fail_on_sql
            && rule.sql == sql
        {
            return Err(Error::execution(sql, FakeSourceError(rule.message.clone())));
        }

        state.executed_sql.push(sql.to_string());
        match sql {
            BEGIN_SQL => state.begin_count += 1,
            COMMIT_SQL => state.commit_count += 1,
            ROLLBACK_SQL => state.rollback_count += 1,
            _ => {}
        }

        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            let table = rest.split_whitespace().next().unwrap_or_default();
            let entry = match table.split_once('.') {
                Some((schema, name)) => (Some(schema.to_string()), name.to_string()),
                None => (None, table.to_string()),
            };
            state.tables.insert(entry);
        } else if let Some(schema) = sql.strip_prefix("CREATE SCHEMA ") {
            state.schemas.insert(schema.trim().to_string());
        }

        Ok(u64::from(sql.starts_with("INSERT")))
    }

    fn query(&self, sql: &str) -> Result<Rows> {
        let mut state = self.lock();
        state.executed_sql.push(sql.to_string());
        Ok(Rows {
            columns: vec!["value".to_string()],
            rows: state.query_rows.clone(),
        })
    }

    fn table_names(&self, schema: Option<&str>) -> Result<Vec<String>> {
        let state = self.lock();
        Ok(state
            .tables
            .iter()
            .filter(|(table_schema, _)| table_schema.as_deref() == schema)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn schema_names(&self) -> Result<Vec<String>> {
        Ok(self.lock().schemas.iter().cloned().collect())
    }

    fn release(&self) {
        self.lock().release_count += 1;
    }
}

#[derive(Debug)]
pub struct FakeSourceError(pub String);

impl fmt::Display for FakeSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for FakeSourceError {}

#[allow(dead_code)]
pub fn text_row(value: &str) -> Row {
    vec![Value::Text(value.to_string())]
}
