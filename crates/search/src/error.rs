pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    UnsupportedType(String),
    #[error("invalid search configuration: {0}")]
    Config(String),
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode search response: {0}")]
    Decode(#[from] serde_json::Error),
}
