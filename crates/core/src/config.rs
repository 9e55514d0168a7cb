use std::fmt;

use crate::{Error, Result};

pub const POOL_SIZE_ENV: &str = "SLUICE_POOL_SIZE";
pub const MAX_OVERFLOW_ENV: &str = "SLUICE_MAX_OVERFLOW";
pub const ECHO_ENV: &str = "SLUICE_ECHO";

const DEFAULT_POOL_SIZE: &str = "3";
const DEFAULT_MAX_OVERFLOW: &str = "0";
const FALSE_ECHO_VALUES: [&str; 7] = ["", "0", "false", "no", "off", "none", "null"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionParams {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: String,
    pub isolation_level: Option<IsolationLevel>,
}

impl ConnectionParams {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn isolation_level(mut self, level: impl Into<IsolationLevel>) -> Self {
        self.isolation_level = Some(level.into());
        self
    }
}

/// Transaction isolation level, passed to the backend verbatim.
///
/// The associated constants are the spellings the bundled backends accept;
/// anything else is forwarded without validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsolationLevel(String);

impl IsolationLevel {
    pub const READ_COMMITTED: &'static str = "READ COMMITTED";
    pub const READ_UNCOMMITTED: &'static str = "READ UNCOMMITTED";
    pub const REPEATABLE_READ: &'static str = "REPEATABLE READ";
    pub const SERIALIZABLE: &'static str = "SERIALIZABLE";
    /// SQL Server only.
    pub const SNAPSHOT: &'static str = "SNAPSHOT";

    pub fn new(level: impl Into<String>) -> Self {
        Self(level.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is(&self, spelling: &str) -> bool {
        self.0.trim().eq_ignore_ascii_case(spelling)
    }
}

impl From<&str> for IsolationLevel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for IsolationLevel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine settings handed to [`crate::Dialect::connect`].
///
/// The bundled adapters hold a single connection and do not pool:
/// `pool_size` and `max_overflow` are resolved and logged but take no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub pool_size: Option<u32>,
    pub max_overflow: Option<u32>,
    pub echo: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            pool_size: Some(3),
            max_overflow: None,
            echo: false,
        }
    }
}

impl EngineOptions {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves options through `lookup` instead of the process environment.
    ///
    /// Zero pool values count as "not set", so backends that cannot pool never
    /// see them.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pool_size = lookup(POOL_SIZE_ENV).unwrap_or_else(|| DEFAULT_POOL_SIZE.to_string());
        let max_overflow =
            lookup(MAX_OVERFLOW_ENV).unwrap_or_else(|| DEFAULT_MAX_OVERFLOW.to_string());
        let echo = lookup(ECHO_ENV).unwrap_or_default();

        Ok(Self {
            pool_size: parse_pool_value(POOL_SIZE_ENV, &pool_size)?,
            max_overflow: parse_pool_value(MAX_OVERFLOW_ENV, &max_overflow)?,
            echo: parse_echo(&echo),
        })
    }

    #[must_use]
    pub fn has_pool_options(&self) -> bool {
        self.pool_size.is_some() || self.max_overflow.is_some()
    }
}

fn parse_pool_value(name: &str, raw: &str) -> Result<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = trimmed.parse::<u32>().map_err(|_| {
        Error::Config(format!(
            "{name} must be a non-negative integer, got `{raw}`"
        ))
    })?;

    Ok((value > 0).then_some(value))
}

fn parse_echo(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    !FALSE_ECHO_VALUES.contains(&normalized.as_str())
}
