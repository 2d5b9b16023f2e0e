//! Response and option types for the proxy client.

use std::time::Duration;

use serde_json::{Map, Value};

/// Decoded-or-raw response body.
///
/// The proxy answers with JSON when it can, but error paths and
/// intermediaries may produce plain text. Callers pattern-match once
/// instead of re-checking the shape at every use site.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Body that parsed as JSON (any top-level value).
    Json(Value),
    /// Body that did not parse as JSON, kept verbatim.
    Text(String),
}

impl Body {
    /// The JSON value, when the body decoded.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Text(_) => None,
        }
    }

    /// The top-level JSON object, when there is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.as_json().and_then(Value::as_object)
    }
}

/// Successful proxy response.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// HTTP status code; polled results report 200.
    pub status: u16,
    /// Response payload.
    pub data: Body,
}

/// Per-call options for submit requests.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Override for the configured submit path.
    pub path: Option<String>,
    /// Extra headers as `"Name: Value"` strings; malformed entries are
    /// silently dropped.
    pub headers: Vec<String>,
    /// Per-call HTTP timeout override.
    pub timeout: Option<Duration>,
    /// Per-call TLS verification override.
    pub verify_tls: Option<bool>,
    /// Sleep between status checks when the proxy defers the request.
    pub poll_interval: Option<Duration>,
    /// Total wait budget when the proxy defers the request.
    pub poll_timeout: Option<Duration>,
}

/// Options for a single status check or a polling wait.
#[derive(Debug, Clone, Default)]
pub struct PollOptions {
    /// Extra headers as `"Name: Value"` strings.
    pub headers: Vec<String>,
    /// Per-status-call HTTP timeout override.
    pub timeout: Option<Duration>,
    /// Per-call TLS verification override.
    pub verify_tls: Option<bool>,
    /// Sleep between status checks; zero falls back to the 5s default.
    pub interval: Option<Duration>,
    /// Total wait budget; the deadline is `max(total_timeout, interval)`
    /// from entry.
    pub total_timeout: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_as_object() {
        let body = Body::Json(json!({"k": 1}));
        assert_eq!(body.as_object().unwrap().get("k"), Some(&json!(1)));

        assert!(Body::Json(json!([1, 2])).as_object().is_none());
        assert!(Body::Text("raw".into()).as_object().is_none());
        assert!(Body::Text("raw".into()).as_json().is_none());
    }
}
