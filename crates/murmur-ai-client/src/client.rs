//! Submit side of the proxy protocol.

use log::debug;
use reqwest::Method;
use serde_json::Value;

use crate::config::ProxyConfig;
use crate::error::{AiProxyError, AiProxyResult};
use crate::transport::{self, build_url, parse_extra_headers};
use crate::types::{Completion, PollOptions, RequestOptions};

/// Async client for the Murmur AI completion proxy.
///
/// Holds the immutable [`ProxyConfig`]; all methods take `&self`, so one
/// client can be shared freely across tasks.
#[derive(Debug, Clone)]
pub struct AiProxyClient {
    config: ProxyConfig,
}

impl AiProxyClient {
    /// Create a client from a resolved configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self { config }
    }

    /// Create a client configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(ProxyConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Submit a completion request, transparently waiting on the status
    /// endpoint when the proxy defers the work.
    ///
    /// The proxy is permitted to answer immediately with the final payload
    /// or to hand back an `ai_request_id`; either way this one call
    /// resolves to the final outcome. `input` must be a non-empty list;
    /// `model` is filled from the configured default when absent.
    pub async fn create_response(
        &self,
        params: Value,
        options: &RequestOptions,
    ) -> AiProxyResult<Completion> {
        let mut payload = params;

        let has_input = payload
            .get("input")
            .and_then(Value::as_array)
            .is_some_and(|input| !input.is_empty());
        if !has_input {
            return Err(AiProxyError::InputMissing);
        }

        if !has_model(&payload) {
            payload["model"] = Value::String(self.config.default_model.clone());
        }

        let initial = self.request(None, payload, options).await?;

        let job_id = initial
            .data
            .as_object()
            .and_then(|object| object.get("ai_request_id"))
            .map(id_text);
        let Some(job_id) = job_id else {
            return Ok(initial);
        };

        debug!("request deferred by proxy, polling job {job_id}");
        let poll = PollOptions {
            headers: options.headers.clone(),
            timeout: options.timeout,
            verify_tls: None,
            interval: options.poll_interval,
            total_timeout: options.poll_timeout,
        };
        self.await_response(&job_id, &poll).await
    }

    /// Perform a raw submit against the proxy.
    ///
    /// The effective path is the explicit `path`, else the option override,
    /// else the configured submit path; with none of the three the call
    /// fails before touching the network, as it does when no project UUID
    /// is configured. `project_uuid` is injected into the payload only when
    /// the caller did not supply one.
    pub async fn request(
        &self,
        path: Option<&str>,
        payload: Value,
        options: &RequestOptions,
    ) -> AiProxyResult<Completion> {
        let resolved_path = non_empty(path.map(str::to_string))
            .or_else(|| non_empty(options.path.clone()))
            .or_else(|| non_empty(self.config.responses_path.clone()))
            .ok_or(AiProxyError::ProjectIdMissing)?;

        let project_uuid = self
            .config
            .project_uuid
            .clone()
            .ok_or(AiProxyError::ProjectUuidMissing)?;

        let mut payload = payload;
        if let Some(object) = payload.as_object_mut() {
            object
                .entry("project_uuid")
                .or_insert_with(|| Value::String(project_uuid.clone()));
        }

        let url = build_url(&resolved_path, &self.config.base_url);
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let verify_tls = options.verify_tls.unwrap_or(self.config.verify_tls);

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            (self.config.project_header.clone(), project_uuid),
        ];
        headers.extend(parse_extra_headers(&options.headers));

        transport::send(
            &url,
            Method::POST,
            Some(&payload),
            &headers,
            timeout,
            verify_tls,
        )
        .await
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

fn has_model(payload: &Value) -> bool {
    match payload.get("model") {
        Some(Value::String(model)) => !model.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// Job identifiers are opaque; the proxy may send them as strings or
/// numbers, and they are only ever echoed back into the status path.
fn id_text(value: &Value) -> String {
    match value {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_has_model() {
        assert!(has_model(&json!({"model": "gpt-5"})));
        assert!(!has_model(&json!({"model": ""})));
        assert!(!has_model(&json!({"model": null})));
        assert!(!has_model(&json!({})));
    }

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(&json!("job-1")), "job-1");
        assert_eq!(id_text(&json!(17)), "17");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("p".into())), Some("p".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }
}
