use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use sluice_core::{
    Backend, ConnectionParams, DatabaseAdapter, Dialect, EngineOptions, Error, IsolationLevel,
    Result, TableModel, Value, literal,
};

use super::fake_adapter::{FakeAdapterHandle, FakeSourceError};

#[derive(Debug, Clone)]
pub struct FakeDialect {
    backend: Backend,
    handle: FakeAdapterHandle,
    connect_failures: Arc<AtomicUsize>,
    connect_attempts: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeDialect {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            handle: FakeAdapterHandle::default(),
            connect_failures: Arc::new(AtomicUsize::new(0)),
            connect_attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The next `count` connection attempts fail.
    pub fn failing_first(self, count: usize) -> Self {
        self.connect_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn handle(&self) -> FakeAdapterHandle {
        self.handle.clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }
}

impl Dialect for FakeDialect {
    fn backend(&self) -> Backend {
        self.backend
    }

    fn connect(
        &self,
        _params: &ConnectionParams,
        _options: &EngineOptions,
    ) -> Result<Box<dyn DatabaseAdapter>> {
        let attempt = self.connect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let remaining = self.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::connection(
                "fake",
                FakeSourceError(format!("connection refused on attempt {attempt}")),
            ));
        }

        Ok(Box::new(self.handle.adapter()))
    }

    fn quote_ident(&self, ident: &str) -> String {
        ident.to_string()
    }

    fn render_literal(&self, value: &Value) -> Result<String> {
        match value {
            Value::Null => Ok("NULL".to_string()),
            Value::Bool(value) => Ok(value.to_string()),
            Value::Integer(value) => Ok(value.to_string()),
            Value::Real(value) => literal::render_real(*value),
            Value::Text(value) => Ok(literal::quote_string("", value)),
            Value::Bytes(_) => Err(Error::UnsupportedType(
                "fake dialect cannot render bytes".to_string(),
            )),
        }
    }

    fn render_create_table(&self, model: &TableModel) -> Result<String> {
        let columns = model
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "CREATE TABLE {} ({columns})",
            self.render_table_name(&model.table_ref())
        ))
    }

    fn isolation_statement(&self, level: &IsolationLevel) -> Option<String> {
        Some(format!("SET ISOLATION {level}"))
    }
}
