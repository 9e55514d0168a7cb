mod database;
mod notify;
mod search;

#[cfg(any(feature = "postgres", feature = "mssql"))]
pub(crate) use database::ServerArgs;
#[cfg(feature = "sqlite")]
pub(crate) use database::SqliteArgs;
pub(crate) use database::run_database;
pub(crate) use notify::{NotifyArgs, run_notify};
pub(crate) use search::{SearchArgs, run_search};
