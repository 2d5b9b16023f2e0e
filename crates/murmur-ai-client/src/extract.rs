//! Heuristic text/JSON extraction from proxy payloads.

use serde_json::{Map, Value};

use crate::error::{AiProxyError, AiProxyResult};
use crate::types::{Body, Completion};

/// Pull the plain-text answer out of a completion outcome.
///
/// Inspects a successful response's data, or the body carried by a non-2xx
/// failure. Handles the Responses-style `output` list, where the first
/// entry with non-empty concatenated `output_text` content wins and later
/// entries are never inspected, then falls back to the chat-style
/// `choices[0].message.content`. Anything else yields an empty string.
pub fn extract_text(outcome: &AiProxyResult<Completion>) -> String {
    let payload = match outcome {
        Ok(completion) => &completion.data,
        Err(AiProxyError::HttpStatus { body, .. }) => body,
        Err(_) => return String::new(),
    };

    match payload {
        Body::Text(text) => text.clone(),
        Body::Json(value) => text_from_value(value),
    }
}

/// Decode a JSON object emitted by the model, tolerating markdown fences.
///
/// Returns `None` when the outcome has no text, the text is not valid
/// JSON, or the top-level value is not an object. Never errors.
pub fn decode_json(outcome: &AiProxyResult<Completion>) -> Option<Map<String, Value>> {
    let text = extract_text(outcome);
    if text.is_empty() {
        return None;
    }

    if let Some(object) = parse_object(&text) {
        return Some(object);
    }

    let mut stripped = text.trim();
    stripped = stripped.strip_prefix("```json").unwrap_or(stripped);
    stripped = stripped.strip_suffix("```").unwrap_or(stripped);
    let stripped = stripped.trim();
    if !stripped.is_empty() && stripped != text {
        return parse_object(stripped);
    }
    None
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(object)) => Some(object),
        _ => None,
    }
}

fn text_from_value(value: &Value) -> String {
    if let Value::String(text) = value {
        return text.clone();
    }
    let Some(object) = value.as_object() else {
        return String::new();
    };

    if let Some(output) = object.get("output").and_then(Value::as_array) {
        for entry in output {
            let combined = output_entry_text(entry);
            if !combined.is_empty() {
                return combined;
            }
        }
    }

    if let Some(content) = object
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
    {
        match content {
            Value::String(text) if !text.is_empty() => return text.clone(),
            Value::String(_) | Value::Null => {}
            other => return other.to_string(),
        }
    }

    String::new()
}

/// Concatenated `output_text` blocks of one `output` entry.
fn output_entry_text(entry: &Value) -> String {
    let mut combined = String::new();
    let Some(content) = entry.get("content").and_then(Value::as_array) else {
        return combined;
    };
    for block in content {
        if block.get("type").and_then(Value::as_str) == Some("output_text") {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                combined.push_str(text);
            }
        }
    }
    combined
}
