use base64::{Engine as _, engine::general_purpose};
use reqwest::{
    blocking::{Client, RequestBuilder},
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::{
    BulkOptions, DeleteOutcome, DocIds, Documents, Error, InsertOutcome, Result, Scan,
    ScanOptions, SearchConfig, SearchCredentials, WriteResult, bulk::parallel_bulk,
    documents::scalar_id,
};

const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Blocking client for one search cluster.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: Url,
    bulk: BulkOptions,
}

/// Builds a client for `url`, reading missing credentials from the process
/// environment unless `no_creds` is set.
pub fn get_client(
    url: &str,
    api_id: Option<&str>,
    api_key: Option<&str>,
    no_creds: bool,
) -> Result<SearchClient> {
    let config = SearchConfig {
        url: url.to_string(),
        api_id: api_id.map(ToString::to_string),
        api_key: api_key.map(ToString::to_string),
        no_creds,
        ..SearchConfig::default()
    };
    get_client_with(&config, |name| std::env::var(name).ok())
}

pub fn get_client_with<F>(config: &SearchConfig, lookup: F) -> Result<SearchClient>
where
    F: Fn(&str) -> Option<String>,
{
    let base_url = Url::parse(&config.url)
        .map_err(|error| Error::Config(format!("invalid url `{}`: {error}", config.url)))?;
    if base_url.cannot_be_a_base() {
        return Err(Error::Config(format!(
            "url `{}` cannot carry a request path",
            config.url
        )));
    }

    let mut headers = HeaderMap::new();
    if config.no_creds {
        debug!(url = %base_url, "building anonymous search client");
    } else {
        let credentials = SearchCredentials::resolve(
            config.api_id.as_deref(),
            config.api_key.as_deref(),
            lookup,
        )?;
        headers.insert(AUTHORIZATION, api_key_header(&credentials)?);
        debug!(url = %base_url, "building search client with api key");
    }

    let mut builder = Client::builder().default_headers(headers);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    Ok(SearchClient {
        http: builder.build()?,
        base_url,
        bulk: config.bulk,
    })
}

fn api_key_header(credentials: &SearchCredentials) -> Result<HeaderValue> {
    let token = general_purpose::STANDARD.encode(format!(
        "{}:{}",
        credentials.api_id, credentials.api_key
    ));
    let mut value = HeaderValue::from_str(&format!("ApiKey {token}"))
        .map_err(|error| Error::Config(format!("invalid api key header: {error}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id")]
    id: String,
    result: String,
}

impl From<WriteResponse> for WriteResult {
    fn from(value: WriteResponse) -> Self {
        Self {
            id: value.id,
            result: value.result,
        }
    }
}

impl SearchClient {
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Streams every document of `index` through the scroll API.
    #[must_use]
    pub fn get_all(&self, index: &str) -> Scan<'_> {
        self.get_all_with(index, ScanOptions::default())
    }

    #[must_use]
    pub fn get_all_with(&self, index: &str, options: ScanOptions) -> Scan<'_> {
        Scan::new(self, index, options)
    }

    /// Indexes one document directly or many through the parallel bulk
    /// helper. A single document keeps its `_id` as the target id.
    pub fn insert(&self, index: &str, docs: impl Into<Documents>) -> Result<InsertOutcome> {
        match docs.into() {
            Documents::One(mut document) => {
                let request = match document.remove("_id") {
                    Some(id) => {
                        let id = scalar_id(&id).ok_or_else(|| {
                            Error::UnsupportedType(
                                "`_id` must be a string or integer.".to_string(),
                            )
                        })?;
                        self.http.put(self.endpoint(&[index, "_doc", id.as_str()])?)
                    }
                    None => self.http.post(self.endpoint(&[index, "_doc"])?),
                };

                let response: WriteResponse = self.send_json(request.json(&document))?;
                debug!(index, id = %response.id, result = %response.result, "indexed document");
                Ok(InsertOutcome::Indexed(response.into()))
            }
            Documents::Many(documents) => {
                parallel_bulk(self, index, &documents, self.bulk).map(InsertOutcome::Bulk)
            }
        }
    }

    pub fn delete(&self, index: &str, ids: impl Into<DocIds>) -> Result<DeleteOutcome> {
        match ids.into() {
            DocIds::One(id) => {
                let request = self.http.delete(self.endpoint(&[index, "_doc", id.as_str()])?);
                let response: WriteResponse = self.send_json(request)?;
                debug!(index, id = %response.id, result = %response.result, "deleted document");
                Ok(DeleteOutcome::Deleted(response.into()))
            }
            DocIds::Many(ids) => {
                let actions = ids
                    .into_iter()
                    .map(|id| {
                        let mut action = Map::new();
                        action.insert("_op_type".to_string(), Value::from("delete"));
                        action.insert("_id".to_string(), Value::from(id));
                        action
                    })
                    .collect::<Vec<_>>();
                parallel_bulk(self, index, &actions, self.bulk).map(DeleteOutcome::Bulk)
            }
        }
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Appends `segments` to the base URL path, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("url `{}` cannot carry a request path", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    pub(crate) fn post_bulk<T>(&self, index: &str, body: String) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self
            .http
            .post(self.endpoint(&[index, "_bulk"])?)
            .header(CONTENT_TYPE, NDJSON_CONTENT_TYPE)
            .body(body);
        self.send_json(request)
    }

    /// Sends `request` and decodes a 2xx body; anything else becomes
    /// [`Error::Api`] with the raw body.
    pub(crate) fn send_json<T>(&self, request: RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
