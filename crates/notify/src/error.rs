pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid notification configuration: {0}")]
    Config(String),
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("messaging API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode messaging response: {0}")]
    Decode(#[from] serde_json::Error),
}
