use std::collections::VecDeque;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::{Result, ScanOptions, SearchClient};

/// One document returned by a scan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Value,
}

#[derive(Debug, Deserialize)]
struct ScrollPage {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: HitList,
}

#[derive(Debug, Deserialize)]
struct HitList {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug)]
enum ScanState {
    Start,
    Active { scroll_id: String },
    Done,
}

/// Lazy scroll over every document matching a query. Pages are fetched on
/// demand; the server-side scroll context is cleared once the scan runs dry
/// or the iterator is dropped early.
///
/// A request failure is yielded once and ends the scan; a scroll context
/// that was already open is cleared first.
#[derive(Debug)]
pub struct Scan<'a> {
    client: &'a SearchClient,
    index: String,
    options: ScanOptions,
    buffer: VecDeque<Hit>,
    state: ScanState,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(client: &'a SearchClient, index: &str, options: ScanOptions) -> Self {
        Self {
            client,
            index: index.to_string(),
            options,
            buffer: VecDeque::new(),
            state: ScanState::Start,
        }
    }

    fn open(&self) -> Result<ScrollPage> {
        let query = self
            .options
            .query
            .clone()
            .unwrap_or_else(|| json!({ "match_all": {} }));
        let body = json!({
            "size": self.options.page_size,
            "sort": ["_doc"],
            "query": query,
        });

        debug!(index = %self.index, scroll = %self.options.scroll, "opening scroll");
        let request = self
            .client
            .http()
            .post(self.client.endpoint(&[self.index.as_str(), "_search"])?)
            .query(&[("scroll", self.options.scroll.as_str())])
            .json(&body);
        self.client.send_json(request)
    }

    fn advance(&self, scroll_id: &str) -> Result<ScrollPage> {
        let request = self
            .client
            .http()
            .post(self.client.endpoint(&["_search", "scroll"])?)
            .json(&json!({ "scroll": self.options.scroll, "scroll_id": scroll_id }));
        self.client.send_json(request)
    }

    fn clear(&self, scroll_id: &str) {
        let cleared = self
            .client
            .endpoint(&["_search", "scroll"])
            .and_then(|url| {
                let request = self
                    .client
                    .http()
                    .delete(url)
                    .json(&json!({ "scroll_id": [scroll_id] }));
                self.client.send_json::<Value>(request)
            });

        if let Err(error) = cleared {
            warn!(index = %self.index, %error, "failed to clear scroll context");
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(hit) = self.buffer.pop_front() {
                return Some(Ok(hit));
            }

            let page = match std::mem::replace(&mut self.state, ScanState::Done) {
                ScanState::Done => return None,
                ScanState::Start => self.open(),
                ScanState::Active { scroll_id } => {
                    let page = self.advance(&scroll_id);
                    if page.is_err() {
                        self.clear(&scroll_id);
                    }
                    page
                }
            };

            let page = match page {
                Ok(page) => page,
                Err(error) => return Some(Err(error)),
            };

            if page.hits.hits.is_empty() {
                if let Some(scroll_id) = page.scroll_id {
                    self.clear(&scroll_id);
                }
                return None;
            }

            self.buffer.extend(page.hits.hits);
            if let Some(scroll_id) = page.scroll_id {
                self.state = ScanState::Active { scroll_id };
            }
        }
    }
}

impl Drop for Scan<'_> {
    fn drop(&mut self) {
        if let ScanState::Active { scroll_id } = &self.state {
            self.clear(scroll_id);
        }
    }
}
