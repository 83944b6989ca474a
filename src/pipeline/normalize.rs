//! Response normalisation: find the QA list inside whatever JSON came back.
//!
//! Asked for a JSON array, models answer with a bare array, an array wrapped
//! in an object under a guessable key, or an array under a key of their own
//! invention. The search order is fixed:
//!
//! 1. the value itself is an array;
//! 2. an object with `qa_pairs`, else `pairs`, else `questions_answers`
//!    (the first of those present decides, array or not);
//! 3. the first entry, in the order the model wrote them, whose value is a
//!    non-empty array starting with an object that has `question` or `q`;
//! 4. nothing.
//!
//! Step 3 depends on `serde_json`'s `preserve_order` feature; with the
//! default sorted map "first" would mean "alphabetically first".

use crate::error::GenerationError;
use crate::types::QaPair;
use serde_json::{Map, Value};

/// Keys checked, in order, when the response is a wrapper object.
pub const WRAPPER_KEYS: [&str; 3] = ["qa_pairs", "pairs", "questions_answers"];

/// Chars of the raw body kept in error previews.
pub const PREVIEW_CHARS: usize = 100;

/// Parse a raw message body into QA pairs.
///
/// A body that is not JSON is an error (with a preview for the log); valid
/// JSON of an unrecognised shape is simply zero pairs.
pub fn parse_response(body: &str) -> Result<Vec<QaPair>, GenerationError> {
    let value: Value = serde_json::from_str(body).map_err(|e| GenerationError::InvalidJson {
        detail: e.to_string(),
        preview: preview(body),
    })?;
    Ok(extract_pairs(&value))
}

/// Locate the list of candidate QA objects in a parsed response.
pub fn locate_qa_list(value: &Value) -> &[Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            if let Some(wrapped) = WRAPPER_KEYS.iter().find_map(|key| map.get(*key)) {
                return wrapped.as_array().map(Vec::as_slice).unwrap_or(&[]);
            }
            map.values()
                .find_map(|v| match v {
                    Value::Array(items) if looks_like_qa_list(items) => Some(items.as_slice()),
                    _ => None,
                })
                .unwrap_or(&[])
        }
        _ => &[],
    }
}

/// Turn the located candidates into pairs, dropping incomplete ones.
pub fn extract_pairs(value: &Value) -> Vec<QaPair> {
    locate_qa_list(value)
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|obj| {
            let question = field(obj, "question", "q");
            let answer = field(obj, "answer", "a");
            if question.is_empty() || answer.is_empty() {
                None
            } else {
                Some(QaPair::new(question, answer))
            }
        })
        .collect()
}

/// First `PREVIEW_CHARS` chars of `body`.
pub fn preview(body: &str) -> String {
    body.chars().take(PREVIEW_CHARS).collect()
}

fn looks_like_qa_list(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|obj| obj.contains_key("question") || obj.contains_key("q"))
}

/// String under `key`, falling back to `fallback` only when `key` is absent.
/// Non-string values read as empty.
fn field<'a>(obj: &'a Map<String, Value>, key: &str, fallback: &str) -> &'a str {
    obj.get(key)
        .or_else(|| obj.get(fallback))
        .and_then(Value::as_str)
        .unwrap_or("")
}
