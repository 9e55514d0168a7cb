use serde_json::{Map, Value};

use crate::{BulkSummary, Error};

pub type Document = Map<String, Value>;

const DOCS_TYPE_MESSAGE: &str = "`docs` must be a list or a dict.";
const DOC_IDS_TYPE_MESSAGE: &str = "`doc_ids` must be a list, string, or integer.";

#[derive(Debug, Clone, PartialEq)]
pub enum Documents {
    One(Document),
    Many(Vec<Document>),
}

impl TryFrom<Value> for Documents {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(document) => Ok(Self::One(document)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(document) => Ok(document),
                    _ => Err(Error::UnsupportedType(DOCS_TYPE_MESSAGE.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            _ => Err(Error::UnsupportedType(DOCS_TYPE_MESSAGE.to_string())),
        }
    }
}

impl From<Document> for Documents {
    fn from(value: Document) -> Self {
        Self::One(value)
    }
}

impl From<Vec<Document>> for Documents {
    fn from(value: Vec<Document>) -> Self {
        Self::Many(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocIds {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<Value> for DocIds {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(scalar_id)
                .collect::<Option<Vec<_>>>()
                .map(Self::Many)
                .ok_or_else(|| Error::UnsupportedType(DOC_IDS_TYPE_MESSAGE.to_string())),
            other => scalar_id(&other)
                .map(Self::One)
                .ok_or_else(|| Error::UnsupportedType(DOC_IDS_TYPE_MESSAGE.to_string())),
        }
    }
}

impl From<&str> for DocIds {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<i64> for DocIds {
    fn from(value: i64) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<String>> for DocIds {
    fn from(value: Vec<String>) -> Self {
        Self::Many(value)
    }
}

pub(crate) fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) if id.is_i64() || id.is_u64() => Some(id.to_string()),
        _ => None,
    }
}

/// Result of a single-document write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub id: String,
    /// `created`, `updated`, `deleted`, ...
    pub result: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Indexed(WriteResult),
    Bulk(BulkSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted(WriteResult),
    Bulk(BulkSummary),
}
