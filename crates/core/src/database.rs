use tracing::{debug, info, warn};

use crate::{
    Backend, ConnectionParams, DatabaseAdapter, Dialect, EngineOptions, Error, InsertTarget,
    Mapping, Metadata, Output, Result, RetryPolicy, Rows, Session, TableModel,
    backend::{DEFAULT_HOST, connection_string},
    connect_with_retry,
    session::echo_sql,
};

/// Connection handle: one dialect, one live connection, one session at a time.
pub struct Database {
    dialect: Box<dyn Dialect>,
    adapter: Box<dyn DatabaseAdapter>,
    params: ConnectionParams,
    options: EngineOptions,
    metadata: Metadata,
}

impl Database {
    /// Connects with engine options from the environment and the default
    /// retry policy.
    pub fn connect<D>(dialect: D, params: ConnectionParams) -> Result<Self>
    where
        D: Dialect + 'static,
    {
        let options = EngineOptions::from_env()?;
        Self::connect_with(dialect, params, options, &RetryPolicy::default())
    }

    pub fn connect_with<D>(
        dialect: D,
        params: ConnectionParams,
        options: EngineOptions,
        policy: &RetryPolicy,
    ) -> Result<Self>
    where
        D: Dialect + 'static,
    {
        if options.has_pool_options() {
            info!(
                backend = dialect.name(),
                pool_size = ?options.pool_size,
                max_overflow = ?options.max_overflow,
                "creating engine with pool options"
            );
        }

        let adapter = connect_with_retry(&dialect, &params, &options, policy)?;

        if let Some(level) = &params.isolation_level {
            match dialect.isolation_statement(level) {
                Some(statement) => {
                    echo_sql(options.echo, &statement);
                    adapter.execute_batch(&statement)?;
                }
                None => debug!(
                    backend = dialect.name(),
                    %level,
                    "isolation level has no effect on this backend"
                ),
            }
        }

        info!(
            "successfully connected to database {} at {}",
            params.database,
            params.host.as_deref().unwrap_or(DEFAULT_HOST)
        );

        Ok(Self {
            dialect: Box::new(dialect),
            adapter,
            params,
            options,
            metadata: Metadata::new(),
        })
    }

    #[must_use]
    pub fn backend(&self) -> Backend {
        self.dialect.backend()
    }

    #[must_use]
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    #[must_use]
    pub fn connection_string(&self) -> String {
        connection_string(self.backend(), &self.params)
    }

    /// Runs `sql`. Statements starting with `SELECT` run directly on the
    /// connection; everything else runs in a managed session and commits.
    /// Either way, a statement that yields rows comes back as [`Output::Rows`].
    pub fn execute(&mut self, sql: &str) -> Result<Output> {
        let command = sql
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if command == "select" {
            return self.query(sql).map(Output::Rows);
        }

        self.with_session(|session| session.run(sql))
    }

    pub fn query(&self, sql: &str) -> Result<Rows> {
        echo_sql(self.options.echo, sql);
        self.adapter.query(sql)
    }

    pub fn session(&mut self) -> Result<Session<'_>> {
        Session::begin(
            self.adapter.as_ref(),
            self.dialect.as_ref(),
            self.options.echo,
        )
    }

    /// Runs `f` in a managed session: commits when it returns `Ok`, rolls
    /// back otherwise. Failures come back as [`Error::Transaction`] wrapping
    /// the original error.
    pub fn with_session<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Session<'_>) -> Result<T>,
    {
        let mut session = self.session()?;

        match f(&mut session) {
            Ok(value) => match session.commit() {
                Ok(()) => Ok(value),
                Err(error) => Err(Error::transaction(error)),
            },
            Err(error) => {
                if let Err(rollback_error) = session.rollback() {
                    warn!(
                        backend = self.dialect.name(),
                        "rollback failed: {rollback_error}"
                    );
                }
                Err(Error::transaction(error))
            }
        }
    }

    pub fn table_exists(&self, table: &str, schema: Option<&str>) -> Result<bool> {
        let tables = self.adapter.table_names(schema)?;
        Ok(tables.iter().any(|name| name == table))
    }

    pub fn schema_exists(&self, schema: &str) -> Result<bool> {
        if !self.backend().supports_schemas() {
            return Ok(false);
        }
        let schemas = self.adapter.schema_names()?;
        Ok(schemas.iter().any(|name| name == schema))
    }

    /// Creates `schema` when missing. No-op on backends without schemas.
    pub fn create_schema(&mut self, schema: &str) -> Result<()> {
        if !self.backend().supports_schemas() || self.schema_exists(schema)? {
            return Ok(());
        }

        let sql = self.dialect.render_create_schema(schema);
        self.run_ddl(&sql)?;
        info!(schema, "created schema");
        Ok(())
    }

    pub fn register_model(&mut self, model: TableModel) {
        self.metadata.register(model);
    }

    /// Creates every registered model whose table is missing.
    pub fn create_tables(&mut self) -> Result<()> {
        let models = self.metadata.models().to_vec();

        for model in &models {
            let table = model.table_ref();
            if let Some(schema) = table.schema() {
                self.create_schema(schema)?;
            }
            if self.table_exists(&table.name, table.schema())? {
                continue;
            }

            let sql = self.dialect.render_create_table(model)?;
            self.run_ddl(&sql)?;
            info!(%table, "created table");
        }

        Ok(())
    }

    /// Inserts one row built from `data` into `target`.
    ///
    /// A missing table is created when `target` is a model; a plain table name
    /// that does not exist fails with [`Error::NotFound`].
    pub fn insert_from_mapping<T>(&mut self, target: T, data: &Mapping) -> Result<()>
    where
        T: Into<InsertTarget>,
    {
        let target = target.into();
        let table = target.table_ref();

        if data.is_empty() {
            return Err(Error::Validation(format!(
                "insert into {table} requires at least one column"
            )));
        }

        if let Some(schema) = table.schema() {
            self.create_schema(schema)?;
        }

        let from_model = matches!(target, InsertTarget::Model(_));
        if let InsertTarget::Model(model) = target {
            self.metadata.register(model);
        }

        if !self.table_exists(&table.name, table.schema())? {
            if !from_model {
                return Err(Error::NotFound {
                    table: table.name.clone(),
                });
            }
            self.create_tables()?;
        }

        self.with_session(|session| session.insert(&table, data))?;
        info!(%table, "data inserted successfully");

        Ok(())
    }

    fn run_ddl(&self, sql: &str) -> Result<()> {
        echo_sql(self.options.echo, sql);
        self.adapter.execute(sql).map(|_| ())
    }
}
