use std::fmt;

use url::form_urlencoded;

use crate::ConnectionParams;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_POSTGRES_PORT: u16 = 5432;
pub const DEFAULT_MSSQL_PORT: u16 = 1433;
pub const MSSQL_ODBC_DRIVER: &str = "ODBC Driver 17 for SQL Server";
pub const IN_MEMORY_DATABASE: &str = ":memory:";

const SQLITE_SESSION_PRELUDE: [&str; 2] = [
    "PRAGMA foreign_keys = ON;",
    "PRAGMA case_sensitive_like = true;",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Postgres,
    MsSql,
    /// Embedded single-file database.
    Sqlite,
}

impl Backend {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MsSql => "mssql",
            Self::Sqlite => "sqlite",
        }
    }

    #[must_use]
    pub fn supports_schemas(self) -> bool {
        !matches!(self, Self::Sqlite)
    }

    #[must_use]
    pub fn default_port(self) -> Option<u16> {
        match self {
            Self::Postgres => Some(DEFAULT_POSTGRES_PORT),
            Self::MsSql => Some(DEFAULT_MSSQL_PORT),
            Self::Sqlite => None,
        }
    }

    /// Statements run on the connection before every managed session begins.
    #[must_use]
    pub fn session_prelude(self) -> &'static [&'static str] {
        match self {
            Self::Sqlite => &SQLITE_SESSION_PRELUDE,
            Self::Postgres | Self::MsSql => &[],
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[must_use]
pub fn connection_string(backend: Backend, params: &ConnectionParams) -> String {
    match backend {
        Backend::Postgres => postgres_uri(params),
        Backend::MsSql => mssql_odbc_uri(params),
        Backend::Sqlite => sqlite_uri(params),
    }
}

fn postgres_uri(params: &ConnectionParams) -> String {
    let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
    let port = params.port.unwrap_or(DEFAULT_POSTGRES_PORT);

    let userinfo = match (&params.user, &params.password) {
        (Some(user), Some(password)) => {
            format!("{}:{}@", encode_userinfo(user), encode_userinfo(password))
        }
        (Some(user), None) => format!("{}@", encode_userinfo(user)),
        (None, _) => String::new(),
    };

    format!(
        "postgresql://{userinfo}{host}:{port}/{}",
        encode_userinfo(&params.database)
    )
}

fn mssql_odbc_uri(params: &ConnectionParams) -> String {
    let host = params.host.as_deref().unwrap_or(DEFAULT_HOST);
    let server = match params.port {
        Some(port) => format!("{host},{port}"),
        None => host.to_string(),
    };

    let odbc = format!(
        "DRIVER={{{MSSQL_ODBC_DRIVER}}};SERVER={server};DATABASE={};UID={};PWD={}",
        params.database,
        params.user.as_deref().unwrap_or_default(),
        params.password.as_deref().unwrap_or_default(),
    );

    format!("mssql+odbc:///?odbc_connect={}", quote_plus(&odbc))
}

fn sqlite_uri(params: &ConnectionParams) -> String {
    let path = params.database.trim();
    if path.is_empty() || path == IN_MEMORY_DATABASE {
        "sqlite://".to_string()
    } else {
        format!("sqlite:///{path}")
    }
}

fn quote_plus(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

fn encode_userinfo(raw: &str) -> String {
    quote_plus(raw).replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::{quote_plus, sqlite_uri};
    use crate::ConnectionParams;

    #[test]
    fn quote_plus_encodes_spaces_as_plus_and_reserved_bytes() {
        assert_eq!(quote_plus("a b;c={d}"), "a+b%3Bc%3D%7Bd%7D");
    }

    #[test]
    fn sqlite_uri_renders_memory_database_without_path() {
        assert_eq!(sqlite_uri(&ConnectionParams::new("")), "sqlite://");
        assert_eq!(sqlite_uri(&ConnectionParams::new(":memory:")), "sqlite://");
        assert_eq!(
            sqlite_uri(&ConnectionParams::new("/tmp/app.db")),
            "sqlite:////tmp/app.db"
        );
    }
}
