//! Result normalization: model reply text → flat record sequence.
//!
//! The model sometimes answers with a bare array and sometimes wraps the
//! records in an object (`{"courses": [...]}`). Both are accepted.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, ScrapeError};
use crate::types::result::Record;
use crate::use_case::Envelope;

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// `[ {...}, {...} ]`
    BareList(Vec<Value>),
    /// `{ "courses": [...] }` or a single record object.
    WrappedObject(Map<String, Value>),
}

impl ModelResponse {
    /// Parse reply text, tolerating a surrounding markdown code fence.
    ///
    /// JSON that is neither an array nor an object is treated as an empty list.
    pub fn parse(text: &str) -> Result<Self> {
        let json = strip_code_fence(text);
        let value: Value = serde_json::from_str(json).map_err(|e| ScrapeError::parse(e, text))?;

        Ok(match value {
            Value::Array(items) => Self::BareList(items),
            Value::Object(map) => Self::WrappedObject(map),
            other => {
                warn!(value = %other, "Model reply is neither a list nor an object");
                Self::BareList(Vec::new())
            }
        })
    }
}

/// Reduce a reply to its records.
pub fn normalize(response: ModelResponse, envelope: &Envelope) -> Vec<Record> {
    let records = match response {
        ModelResponse::BareList(items) => keep_objects(items),
        ModelResponse::WrappedObject(mut map) => match map.remove(envelope.key()) {
            Some(Value::Array(items)) => keep_objects(items),
            Some(Value::Object(record)) => vec![record],
            Some(other) => {
                warn!(key = envelope.key(), value = %other, "Records key holds no records");
                Vec::new()
            }
            None => match envelope {
                Envelope::KeyedOrSelf(_) if !map.is_empty() => vec![map],
                _ => Vec::new(),
            },
        },
    };

    debug!(count = records.len(), key = envelope.key(), "Normalized records");
    records
}

/// Parse and normalize in one step.
pub fn normalize_text(text: &str, envelope: &Envelope) -> Result<Vec<Record>> {
    Ok(normalize(ModelResponse::parse(text)?, envelope))
}

fn keep_objects(items: Vec<Value>) -> Vec<Record> {
    let total = items.len();
    let records: Vec<Record> = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();

    if records.len() < total {
        warn!(
            dropped = total - records.len(),
            "Dropped list items that are not objects"
        );
    }
    records
}

/// Strip a ```` ```json ```` fence if the whole reply is wrapped in one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the language tag on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}
