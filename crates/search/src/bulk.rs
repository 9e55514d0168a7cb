//! Bulk helper: expands actions into NDJSON and ships chunks in parallel.

use rayon::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{BulkOptions, Document, Error, Result, SearchClient};

const DEFAULT_OP_TYPE: &str = "index";
const OP_TYPE_KEY: &str = "_op_type";
const SOURCE_KEY: &str = "_source";

/// Metadata keys moved from a document into its action line verbatim.
const VERBATIM_META_KEYS: [&str; 9] = [
    "_id",
    "_index",
    "if_seq_no",
    "if_primary_term",
    "pipeline",
    "retry_on_conflict",
    "routing",
    "version",
    "version_type",
];

/// Metadata keys whose leading underscore is dropped in the action line.
const UNDERSCORED_META_KEYS: [&str; 6] = [
    "_if_seq_no",
    "_if_primary_term",
    "_retry_on_conflict",
    "_routing",
    "_version",
    "_version_type",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItemError {
    pub op_type: String,
    pub id: Option<String>,
    pub status: u16,
    pub reason: String,
}

/// Outcome of a drained bulk stream. Item failures are counted here instead
/// of aborting the whole operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<BulkItemError>,
}

impl BulkSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn merge(mut self, other: Self) -> Self {
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.errors.extend(other.errors);
        self
    }
}

/// Splits one caller action into the action line and the optional source
/// line.
pub(crate) fn expand_action(mut document: Document) -> (Value, Option<Value>) {
    let op_type = match document.remove(OP_TYPE_KEY) {
        Some(Value::String(op_type)) => op_type,
        _ => DEFAULT_OP_TYPE.to_string(),
    };

    let mut meta = Map::new();
    for key in VERBATIM_META_KEYS {
        if let Some(value) = document.remove(key) {
            meta.insert(key.to_string(), value);
        }
    }
    for key in UNDERSCORED_META_KEYS {
        if let Some(value) = document.remove(key) {
            meta.insert(key.trim_start_matches('_').to_string(), value);
        }
    }

    let mut action = Map::new();
    action.insert(op_type.clone(), Value::Object(meta));

    if op_type == "delete" {
        return (Value::Object(action), None);
    }

    let source = match document.remove(SOURCE_KEY) {
        Some(source) => source,
        None => Value::Object(document),
    };
    (Value::Object(action), Some(source))
}

pub(crate) fn render_ndjson(actions: &[Document]) -> Result<String> {
    let mut body = String::new();
    for document in actions {
        let (action, source) = expand_action(document.clone());
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        if let Some(source) = source {
            body.push_str(&serde_json::to_string(&source)?);
            body.push('\n');
        }
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct BulkItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    status: u16,
    error: Option<Value>,
}

fn summarize(response: BulkResponse) -> Result<BulkSummary> {
    let mut summary = BulkSummary::default();

    for entry in response.items {
        for (op_type, item) in entry {
            let item: BulkItem = serde_json::from_value(item)?;
            if (200..300).contains(&item.status) {
                summary.succeeded += 1;
                continue;
            }

            summary.failed += 1;
            summary.errors.push(BulkItemError {
                op_type,
                id: item.id,
                status: item.status,
                reason: item
                    .error
                    .map_or_else(|| "unknown error".to_string(), |error| error.to_string()),
            });
        }
    }

    Ok(summary)
}

/// Sends `actions` to `index` in chunks from a dedicated thread pool and
/// drains every response into one summary.
pub(crate) fn parallel_bulk(
    client: &SearchClient,
    index: &str,
    actions: &[Document],
    options: BulkOptions,
) -> Result<BulkSummary> {
    if actions.is_empty() {
        return Ok(BulkSummary::default());
    }

    let chunk_size = options.chunk_size.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.thread_count.max(1))
        .build()
        .map_err(|error| Error::Config(format!("failed to build bulk thread pool: {error}")))?;

    let chunks = actions.chunks(chunk_size).collect::<Vec<_>>();
    debug!(
        index,
        actions = actions.len(),
        chunks = chunks.len(),
        "sending bulk request"
    );

    let summaries = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| {
                let body = render_ndjson(chunk)?;
                let response: BulkResponse = client.post_bulk(index, body)?;
                summarize(response)
            })
            .collect::<Vec<Result<BulkSummary>>>()
    });

    let mut total = BulkSummary::default();
    for summary in summaries {
        total = total.merge(summary?);
    }

    if !total.is_success() {
        warn!(
            index,
            failed = total.failed,
            succeeded = total.succeeded,
            "bulk request finished with item failures"
        );
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{expand_action, render_ndjson};
    use crate::Document;

    fn document(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn plain_document_becomes_index_action_with_source() {
        let (action, source) = expand_action(document(json!({"name": "a"})));

        assert_eq!(action, json!({"index": {}}));
        assert_eq!(source, Some(json!({"name": "a"})));
    }

    #[test]
    fn metadata_keys_move_into_the_action_line() {
        let (action, source) = expand_action(document(json!({
            "_id": 3,
            "_routing": "r1",
            "pipeline": "p",
            "name": "a",
        })));

        assert_eq!(
            action,
            json!({"index": {"_id": 3, "routing": "r1", "pipeline": "p"}})
        );
        assert_eq!(source, Some(json!({"name": "a"})));
    }

    #[test]
    fn delete_actions_carry_no_source() {
        let (action, source) = expand_action(document(json!({"_op_type": "delete", "_id": "x"})));

        assert_eq!(action, json!({"delete": {"_id": "x"}}));
        assert_eq!(source, None);
    }

    #[test]
    fn explicit_source_wins_over_remaining_fields() {
        let (_, source) = expand_action(document(json!({
            "_op_type": "update",
            "_id": 1,
            "_source": {"doc": {"name": "b"}},
        })));

        assert_eq!(source, Some(json!({"doc": {"name": "b"}})));
    }

    #[test]
    fn ndjson_ends_every_line_with_newline() {
        let body = render_ndjson(&[
            document(json!({"a": 1})),
            document(json!({"_op_type": "delete", "_id": "2"})),
        ])
        .expect("render");

        assert_eq!(
            body,
            "{\"index\":{}}\n{\"a\":1}\n{\"delete\":{\"_id\":\"2\"}}\n"
        );
    }
}
