use std::error::Error as StdError;

pub type BoxError = Box<dyn StdError + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Validation,
    NotFound,
    Transaction,
    UnsupportedType,
    Execution,
    Config,
    Custom,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to connect to {backend} database: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: BoxError,
    },
    #[error("{0}")]
    Validation(String),
    #[error("{table} does not exist!")]
    NotFound { table: String },
    /// A failure raised inside a managed session. The session was rolled back
    /// before this error was returned.
    #[error("transaction rolled back: {source}")]
    Transaction {
        #[source]
        source: Box<Error>,
    },
    #[error("unsupported value: {0}")]
    UnsupportedType(String),
    #[error("statement failed: `{sql}`: {source}")]
    Execution {
        sql: String,
        #[source]
        source: BoxError,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Custom(BoxError),
}

impl Error {
    pub fn connection<E>(backend: &'static str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Connection {
            backend,
            source: Box::new(source),
        }
    }

    pub fn execution<E>(sql: &str, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Execution {
            sql: sql.to_string(),
            source: Box::new(source),
        }
    }

    pub fn custom<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Custom(Box::new(source))
    }

    pub(crate) fn transaction(source: Error) -> Self {
        Self::Transaction {
            source: Box::new(source),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Transaction { .. } => ErrorKind::Transaction,
            Self::UnsupportedType(_) => ErrorKind::UnsupportedType,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Config(_) => ErrorKind::Config,
            Self::Custom(_) => ErrorKind::Custom,
        }
    }

    /// Kind of the innermost error, looking through transaction wrappers.
    #[must_use]
    pub fn root_kind(&self) -> ErrorKind {
        self.root().kind()
    }

    #[must_use]
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Self::Transaction { source } = current {
            current = source.as_ref();
        }
        current
    }
}
