use std::time::Duration;

use serde_json::Value;

use crate::{Error, Result};

pub const API_ID_ENV: &str = "ELASTIC_API_ID";
pub const API_KEY_ENV: &str = "ELASTIC_API_KEY";

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_THREAD_COUNT: usize = 4;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_SCROLL: &str = "5m";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub api_id: String,
    pub api_key: String,
}

impl SearchCredentials {
    /// Explicit values win; missing ones are looked up through `lookup` at
    /// call time.
    pub fn resolve<F>(api_id: Option<&str>, api_key: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_id = api_id
            .map(ToString::to_string)
            .or_else(|| lookup(API_ID_ENV))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Pass in Elastic API ID to function or set env var {API_ID_ENV}"
                ))
            })?;
        let api_key = api_key
            .map(ToString::to_string)
            .or_else(|| lookup(API_KEY_ENV))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Pass in Elastic API KEY to function or set env var {API_KEY_ENV}"
                ))
            })?;

        Ok(Self { api_id, api_key })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOptions {
    pub chunk_size: usize,
    pub thread_count: usize,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            thread_count: DEFAULT_THREAD_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Search body `query`; `match_all` when unset.
    pub query: Option<Value>,
    pub page_size: usize,
    pub scroll: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            query: None,
            page_size: DEFAULT_PAGE_SIZE,
            scroll: DEFAULT_SCROLL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchConfig {
    pub url: String,
    pub api_id: Option<String>,
    pub api_key: Option<String>,
    /// Build an anonymous client; credentials and the environment are never
    /// consulted.
    pub no_creds: bool,
    /// Request timeout; the HTTP client's default when unset.
    pub timeout: Option<Duration>,
    pub bulk: BulkOptions,
}

impl SearchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn credentials(mut self, api_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.api_id = Some(api_id.into());
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn no_creds(mut self, no_creds: bool) -> Self {
        self.no_creds = no_creds;
        self
    }

    #[must_use]
    pub fn bulk(mut self, bulk: BulkOptions) -> Self {
        self.bulk = bulk;
        self
    }
}
