use std::io;

use anyhow::Context;
use miette::Report;
use sluice_core::ErrorKind;

const DATABASE_CONTEXT: &str = "while running database command";
const SEARCH_CONTEXT: &str = "while calling search API";
const NOTIFY_CONTEXT: &str = "while sending text notification";
const STDIN_READ_CONTEXT: &str = "while reading documents from stdin";
const JSON_CONTEXT: &str = "while parsing JSON argument";

pub(crate) const RUNTIME_EXIT_CODE: i32 = 1;
pub(crate) const USAGE_EXIT_CODE: i32 = 2;

pub(crate) type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug)]
pub(crate) enum CliError {
    InvalidArgument(String),
    ReadStdin(io::Error),
    Json(serde_json::Error),
    Core(sluice_core::Error),
    Search(sluice_search::Error),
    BulkFailures { failed: usize, succeeded: usize },
    Notify(sluice_notify::Error),
}

impl From<sluice_core::Error> for CliError {
    fn from(value: sluice_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<sluice_search::Error> for CliError {
    fn from(value: sluice_search::Error) -> Self {
        Self::Search(value)
    }
}

impl From<sluice_notify::Error> for CliError {
    fn from(value: sluice_notify::Error) -> Self {
        Self::Notify(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl CliError {
    pub(crate) fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => USAGE_EXIT_CODE,
            _ => RUNTIME_EXIT_CODE,
        }
    }
}

pub(crate) fn render_runtime_error(error: CliError) -> String {
    match error {
        CliError::InvalidArgument(message) => format!("[usage] {message}"),
        CliError::ReadStdin(source) => {
            let report = report_with_context(source, STDIN_READ_CONTEXT);
            format!("[io] {report}")
        }
        CliError::Json(source) => {
            let report = report_with_context(source, JSON_CONTEXT);
            format!("[usage] {report}")
        }
        CliError::Core(source) => {
            let category = core_category(source.root_kind());
            let report = report_with_context(source, DATABASE_CONTEXT);
            format!("[{category}] {report}")
        }
        CliError::Search(source) => {
            let category = search_category(&source);
            let report = report_with_context(source, SEARCH_CONTEXT);
            format!("[{category}] {report}")
        }
        CliError::BulkFailures { failed, succeeded } => {
            format!("[bulk] {failed} bulk items failed ({succeeded} succeeded)")
        }
        CliError::Notify(source) => {
            let category = notify_category(&source);
            let report = report_with_context(source, NOTIFY_CONTEXT);
            format!("[{category}] {report}")
        }
    }
}

fn report_with_context<E, C>(source: E, context: C) -> Report
where
    E: std::error::Error + Send + Sync + 'static,
    C: Into<String>,
{
    let context = context.into();
    let anyhow_error = std::result::Result::<(), E>::Err(source)
        .context(context)
        .expect_err("context wrapping must produce an error");
    miette::miette!("{anyhow_error:#}")
}

fn core_category(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Connection => "connection",
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not-found",
        ErrorKind::Transaction => "transaction",
        ErrorKind::UnsupportedType => "unsupported-type",
        ErrorKind::Execution => "execution",
        ErrorKind::Config => "config",
        ErrorKind::Custom => "custom",
    }
}

fn search_category(error: &sluice_search::Error) -> &'static str {
    match error {
        sluice_search::Error::Validation(_) => "validation",
        sluice_search::Error::UnsupportedType(_) => "unsupported-type",
        sluice_search::Error::Config(_) => "config",
        sluice_search::Error::Http(_) => "http",
        sluice_search::Error::Api { .. } => "api",
        sluice_search::Error::Decode(_) => "decode",
    }
}

fn notify_category(error: &sluice_notify::Error) -> &'static str {
    match error {
        sluice_notify::Error::Config(_) => "config",
        sluice_notify::Error::Http(_) => "http",
        sluice_notify::Error::Api { .. } => "api",
        sluice_notify::Error::Decode(_) => "decode",
    }
}
