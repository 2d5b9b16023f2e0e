//! Shared mock proxy and test setup.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use murmur_ai_client::ProxyConfig;
use serde_json::Value;

pub const TEST_PROJECT_UUID: &str = "00000000-0000-4000-8000-000000000042";

/// Scripted state of the mock proxy.
pub struct ProxyState {
    submit_reply: (u16, Value),
    status_replies: Vec<(u16, Value)>,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub last_submit_body: Mutex<Option<Value>>,
    pub last_submit_headers: Mutex<Option<HashMap<String, String>>>,
    pub last_job: Mutex<Option<String>>,
}

/// A mock proxy listening on a local port.
pub struct TestProxy {
    pub base_url: String,
    pub state: Arc<ProxyState>,
}

impl TestProxy {
    /// Spawn a mock proxy. `submit_reply` answers every POST to the submit
    /// path; `status_replies` are consumed in order by status calls, with
    /// the last one repeating.
    pub async fn spawn(submit_reply: (u16, Value), status_replies: Vec<(u16, Value)>) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let state = Arc::new(ProxyState {
            submit_reply,
            status_replies,
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            last_submit_body: Mutex::new(None),
            last_submit_headers: Mutex::new(None),
            last_job: Mutex::new(None),
        });

        let app = Router::new()
            .route("/projects/{id}/ai-request", post(handle_submit))
            .route("/custom", post(handle_submit))
            .route("/projects/{id}/ai-request/{job}/status", get(handle_status))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Client configuration pointed at this proxy.
    pub fn config(&self) -> ProxyConfig {
        ProxyConfig {
            base_url: self.base_url.clone(),
            responses_path: Some("/projects/42/ai-request".to_string()),
            project_id: Some("42".to_string()),
            project_uuid: Some(TEST_PROJECT_UUID.to_string()),
            project_header: "project-uuid".to_string(),
            default_model: "gpt-5-mini".to_string(),
            timeout: Duration::from_secs(5),
            verify_tls: true,
        }
    }
}

async fn handle_submit(
    State(state): State<Arc<ProxyState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.submit_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_submit_body.lock().unwrap() = Some(body);
    *state.last_submit_headers.lock().unwrap() = Some(header_map(&headers));
    reply(state.submit_reply.clone())
}

async fn handle_status(
    State(state): State<Arc<ProxyState>>,
    Path((_id, job)): Path<(String, String)>,
) -> Response {
    let call = state.status_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_job.lock().unwrap() = Some(job);

    let scripted = state
        .status_replies
        .get(call)
        .or_else(|| state.status_replies.last())
        .cloned()
        .unwrap_or((500, Value::String("status script exhausted".to_string())));
    reply(scripted)
}

/// String replies go out as raw text, everything else as JSON.
fn reply((code, body): (u16, Value)) -> Response {
    let status = StatusCode::from_u16(code).unwrap();
    match body {
        Value::String(text) => (status, text).into_response(),
        other => (status, Json(other)).into_response(),
    }
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect()
}
