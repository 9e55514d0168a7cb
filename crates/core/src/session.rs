use tracing::{info, trace, warn};

use crate::{DatabaseAdapter, Dialect, Mapping, Output, Result, Rows, TableRef};

pub(crate) const ECHO_TARGET: &str = "sluice::echo";

/// How a session ended. `commit` and `rollback` consume the session, so
/// outside code only ever sees `Open`; the final state is reported by the
/// `session closed` trace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Committed,
    RolledBack,
}

/// A unit of work on the database connection.
///
/// Dropping a session that was neither committed nor rolled back rolls it
/// back. The adapter is released exactly once, when the session is dropped.
pub struct Session<'a> {
    adapter: &'a dyn DatabaseAdapter,
    dialect: &'a dyn Dialect,
    echo: bool,
    state: SessionState,
}

impl<'a> Session<'a> {
    pub(crate) fn begin(
        adapter: &'a dyn DatabaseAdapter,
        dialect: &'a dyn Dialect,
        echo: bool,
    ) -> Result<Self> {
        for statement in dialect.backend().session_prelude() {
            echo_sql(echo, statement);
            adapter.execute_batch(statement)?;
        }

        adapter.begin()?;
        trace!(backend = dialect.name(), "session opened");

        Ok(Self {
            adapter,
            dialect,
            echo,
            state: SessionState::Open,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn execute(&mut self, sql: &str) -> Result<u64> {
        echo_sql(self.echo, sql);
        self.adapter.execute(sql)
    }

    /// Like [`Session::execute`], but returns rows when the statement yields any.
    pub fn run(&mut self, sql: &str) -> Result<Output> {
        echo_sql(self.echo, sql);
        self.adapter.run(sql)
    }

    pub fn query(&mut self, sql: &str) -> Result<Rows> {
        echo_sql(self.echo, sql);
        self.adapter.query(sql)
    }

    pub fn insert(&mut self, table: &TableRef, data: &Mapping) -> Result<u64> {
        let sql = self.dialect.render_insert(table, data)?;
        self.execute(&sql)
    }

    /// On failure the session stays open and is rolled back when dropped.
    pub fn commit(mut self) -> Result<()> {
        self.adapter.commit()?;
        self.state = SessionState::Committed;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.state = SessionState::RolledBack;
        self.adapter.rollback()
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if self.state == SessionState::Open {
            self.state = SessionState::RolledBack;
            if let Err(error) = self.adapter.rollback() {
                warn!(backend = self.dialect.name(), "rollback on drop failed: {error}");
            }
        }

        self.adapter.release();
        trace!(backend = self.dialect.name(), outcome = ?self.state, "session closed");
    }
}

pub(crate) fn echo_sql(enabled: bool, sql: &str) {
    if enabled {
        info!(target: ECHO_TARGET, "{}", sql.trim());
    }
}
