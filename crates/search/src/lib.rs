mod bulk;
mod client;
mod config;
mod documents;
mod error;
mod scan;

pub use bulk::{BulkItemError, BulkSummary};
pub use client::{SearchClient, get_client, get_client_with};
pub use config::{
    API_ID_ENV, API_KEY_ENV, BulkOptions, DEFAULT_CHUNK_SIZE, DEFAULT_PAGE_SIZE, DEFAULT_SCROLL,
    DEFAULT_THREAD_COUNT, ScanOptions, SearchConfig, SearchCredentials,
};
pub use documents::{DeleteOutcome, DocIds, Document, Documents, InsertOutcome, WriteResult};
pub use error::{Error, Result};
pub use scan::{Hit, Scan};
