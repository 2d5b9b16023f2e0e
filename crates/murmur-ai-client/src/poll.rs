//! Status polling for deferred proxy requests.

use std::time::Duration;

use log::debug;
use reqwest::Method;
use serde_json::Value;
use tokio::time::{Instant, sleep};

use crate::client::AiProxyClient;
use crate::error::{AiProxyError, AiProxyResult};
use crate::transport::{self, build_url, field_text, parse_extra_headers};
use crate::types::{Body, Completion, PollOptions};

/// Default sleep between status checks.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Default total wait budget for a deferred request.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Message used when a failed job reports no error text.
const GENERIC_JOB_FAILURE: &str = "AI request failed";

impl AiProxyClient {
    /// Check the status of a deferred request once.
    pub async fn fetch_status(
        &self,
        job_id: &str,
        options: &PollOptions,
    ) -> AiProxyResult<Completion> {
        let config = self.config();
        let project_uuid = config
            .project_uuid
            .clone()
            .ok_or(AiProxyError::ProjectUuidMissing)?;

        let path = status_path(job_id, config.responses_path.as_deref());
        let url = build_url(&path, &config.base_url);
        let timeout = options.timeout.unwrap_or(config.timeout);
        let verify_tls = options.verify_tls.unwrap_or(config.verify_tls);

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            (config.project_header.clone(), project_uuid),
        ];
        headers.extend(parse_extra_headers(&options.headers));

        transport::send(&url, Method::GET, None, &headers, timeout, verify_tls).await
    }

    /// Poll the status endpoint until the request completes, fails, or the
    /// deadline passes.
    ///
    /// The deadline is fixed at entry to `now + max(total_timeout,
    /// interval)`. A transport or protocol failure on any single status
    /// check aborts the wait and is returned as-is; the loop never retries
    /// a failed status call. Status calls are strictly sequential.
    pub async fn await_response(
        &self,
        job_id: &str,
        options: &PollOptions,
    ) -> AiProxyResult<Completion> {
        let total = options.total_timeout.unwrap_or(DEFAULT_POLL_TIMEOUT);
        let mut interval = options.interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        if interval.is_zero() {
            interval = DEFAULT_POLL_INTERVAL;
        }
        let deadline = Instant::now() + total.max(interval);

        let status_options = PollOptions {
            headers: options.headers.clone(),
            timeout: options.timeout,
            verify_tls: options.verify_tls,
            interval: None,
            total_timeout: None,
        };

        loop {
            let checked = self.fetch_status(job_id, &status_options).await?;
            if let Some(outcome) = terminal_outcome(&checked.data) {
                return outcome;
            }

            if Instant::now() >= deadline {
                return Err(AiProxyError::Timeout);
            }
            debug!("job {job_id} not terminal, sleeping {interval:?}");
            sleep(interval).await;
        }
    }
}

/// Status URL path for a job: the configured submit path, guaranteed to
/// end in `/ai-request`, with `/{job}/status` appended.
fn status_path(job_id: &str, responses_path: Option<&str>) -> String {
    let base = responses_path.unwrap_or("").trim_end_matches('/');
    if base.is_empty() {
        return format!("/ai-request/{job_id}/status");
    }
    if base.ends_with("/ai-request") {
        format!("{base}/{job_id}/status")
    } else {
        format!("{base}/ai-request/{job_id}/status")
    }
}

/// Terminal outcome for a status payload, when it has one.
///
/// `success` resolves to the nested `response` value when the key is
/// present, else the whole status object; `failed` resolves to a
/// [`AiProxyError::JobFailed`] carrying the raw status payload. Anything
/// else, including non-object payloads, keeps the poll going.
fn terminal_outcome(data: &Body) -> Option<AiProxyResult<Completion>> {
    let object = data.as_object()?;
    match object.get("status").and_then(Value::as_str) {
        Some("success") => {
            let payload = object
                .get("response")
                .cloned()
                .unwrap_or_else(|| Value::Object(object.clone()));
            Some(Ok(Completion {
                status: 200,
                data: Body::Json(payload),
            }))
        }
        Some("failed") => {
            let message = object
                .get("error")
                .and_then(field_text)
                .unwrap_or_else(|| GENERIC_JOB_FAILURE.to_string());
            Some(Err(AiProxyError::JobFailed {
                message,
                data: Value::Object(object.clone()),
            }))
        }
        _ => None,
    }
}
