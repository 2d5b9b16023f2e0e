//! One-shot HTTP transport for the proxy.

use std::time::Duration;

use log::debug;
use reqwest::{Client, Method};
use serde_json::Value;

use crate::error::{AiProxyError, AiProxyResult};
use crate::types::{Body, Completion};

/// Message used when an error body carries no usable text.
const GENERIC_HTTP_ERROR: &str = "AI proxy request failed";

/// Perform one request against the proxy.
///
/// Transport-level failures (DNS, connect, timeout) come back as
/// [`AiProxyError::RequestFailed`]; non-2xx statuses as
/// [`AiProxyError::HttpStatus`] with the message lifted from the decoded
/// body where possible. Undecodable bodies are carried as raw text.
pub(crate) async fn send(
    url: &str,
    method: Method,
    body: Option<&Value>,
    headers: &[(String, String)],
    timeout: Duration,
    verify_tls: bool,
) -> AiProxyResult<Completion> {
    let client = build_client(timeout, verify_tls)?;

    let mut request = client.request(method.clone(), url);
    for (name, value) in headers {
        request = request.header(name, value);
    }
    if let Some(payload) = body {
        request = request.json(payload);
    }

    debug!("{method} {url}");
    let response = request
        .send()
        .await
        .map_err(|err| AiProxyError::RequestFailed {
            message: err.to_string(),
        })?;

    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|err| AiProxyError::RequestFailed {
            message: err.to_string(),
        })?;

    let data = decode_body(&text);
    if (200..300).contains(&status) {
        return Ok(Completion { status, data });
    }

    Err(AiProxyError::HttpStatus {
        status,
        message: error_message(&data, &text),
        body: data,
    })
}

/// `verify_tls == false` disables certificate validation entirely.
/// Insecure; intended only for trusted internal endpoints.
fn build_client(timeout: Duration, verify_tls: bool) -> AiProxyResult<Client> {
    let mut builder = Client::builder().timeout(timeout);
    if !verify_tls {
        builder = builder.danger_accept_invalid_certs(true);
    }
    builder.build().map_err(|err| AiProxyError::RequestFailed {
        message: err.to_string(),
    })
}

fn decode_body(text: &str) -> Body {
    if text.is_empty() {
        return Body::Text(String::new());
    }
    match serde_json::from_str(text) {
        Ok(value) => Body::Json(value),
        Err(_) => Body::Text(text.to_string()),
    }
}

/// Error message for a non-2xx response: the decoded object's `error` or
/// `message` field when present, the raw body otherwise.
fn error_message(data: &Body, raw: &str) -> String {
    if let Some(object) = data.as_object() {
        return object
            .get("error")
            .and_then(field_text)
            .or_else(|| object.get("message").and_then(field_text))
            .unwrap_or_else(|| GENERIC_HTTP_ERROR.to_string());
    }
    if raw.is_empty() {
        GENERIC_HTTP_ERROR.to_string()
    } else {
        raw.to_string()
    }
}

/// Text of a JSON field: non-empty strings verbatim, null and empty
/// strings as nothing, other values serialized.
pub(crate) fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Resolve an absolute request URL. Values already carrying a scheme are
/// used verbatim; anything else is appended to the base URL with exactly
/// one separating slash.
pub(crate) fn build_url(path: &str, base_url: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return trimmed.to_string();
    }
    if trimmed.starts_with('/') {
        format!("{base_url}{trimmed}")
    } else {
        format!("{base_url}/{trimmed}")
    }
}

/// Parse extra `"Name: Value"` header strings. Entries without a colon or
/// with an empty name are silently dropped; names and values are trimmed.
pub(crate) fn parse_extra_headers(raw: &[String]) -> Vec<(String, String)> {
    raw.iter()
        .filter_map(|header| {
            let (name, value) = header.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_body_json_or_raw() {
        assert_eq!(decode_body("{\"k\":1}"), Body::Json(json!({"k": 1})));
        assert_eq!(decode_body("[1,2]"), Body::Json(json!([1, 2])));
        assert_eq!(decode_body("not json"), Body::Text("not json".into()));
        assert_eq!(decode_body(""), Body::Text(String::new()));
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        let data = decode_body("{\"error\":\"boom\",\"message\":\"ignored\"}");
        assert_eq!(error_message(&data, "raw"), "boom");
    }

    #[test]
    fn test_error_message_falls_back_to_message_field() {
        let data = decode_body("{\"message\":\"slow down\"}");
        assert_eq!(error_message(&data, "raw"), "slow down");
    }

    #[test]
    fn test_error_message_object_without_fields_is_generic() {
        let data = decode_body("{\"detail\":\"nope\"}");
        assert_eq!(error_message(&data, "{\"detail\":\"nope\"}"), "AI proxy request failed");
    }

    #[test]
    fn test_error_message_empty_error_field_falls_through() {
        let data = decode_body("{\"error\":\"\",\"message\":\"used\"}");
        assert_eq!(error_message(&data, "raw"), "used");
    }

    #[test]
    fn test_error_message_non_object_body_uses_raw_text() {
        let data = decode_body("[\"half\",\"open\"]");
        assert_eq!(error_message(&data, "[\"half\",\"open\"]"), "[\"half\",\"open\"]");

        let data = decode_body("service exploded");
        assert_eq!(error_message(&data, "service exploded"), "service exploded");

        let data = decode_body("");
        assert_eq!(error_message(&data, ""), "AI proxy request failed");
    }

    #[test]
    fn test_build_url_relative_and_absolute() {
        assert_eq!(
            build_url("ai-request", "https://x.com"),
            "https://x.com/ai-request"
        );
        assert_eq!(
            build_url("/ai-request", "https://x.com"),
            "https://x.com/ai-request"
        );
        assert_eq!(
            build_url("https://y.com/z", "https://x.com"),
            "https://y.com/z"
        );
        assert_eq!(
            build_url("  /padded  ", "https://x.com"),
            "https://x.com/padded"
        );
    }

    #[test]
    fn test_parse_extra_headers() {
        let raw = vec![
            "X-Trace: abc".to_string(),
            "X-Spaced :  padded value ".to_string(),
            "malformed".to_string(),
            ": empty-name".to_string(),
        ];
        let parsed = parse_extra_headers(&raw);
        assert_eq!(
            parsed,
            vec![
                ("X-Trace".to_string(), "abc".to_string()),
                ("X-Spaced".to_string(), "padded value".to_string()),
            ]
        );
    }

    #[test]
    fn test_field_text_shapes() {
        assert_eq!(field_text(&json!("boom")), Some("boom".to_string()));
        assert_eq!(field_text(&json!("")), None);
        assert_eq!(field_text(&Value::Null), None);
        assert_eq!(field_text(&json!(503)), Some("503".to_string()));
    }
}
