//! Client for the Murmur AI completion proxy.
//!
//! The proxy accepts a completion submission and either answers with the
//! final payload right away or hands back a job id for asynchronous
//! processing. [`AiProxyClient::create_response`] absorbs both paths behind
//! one call: it submits, and when the proxy defers, polls the status
//! endpoint until the job reaches a terminal state or the deadline passes.
//!
//! ```no_run
//! use murmur_ai_client::{decode_json, AiProxyClient, RequestOptions};
//! use serde_json::json;
//!
//! # async fn run() {
//! let client = AiProxyClient::from_env();
//! let outcome = client
//!     .create_response(
//!         json!({
//!             "input": [
//!                 {"role": "system", "content": "You are a helpful assistant."},
//!                 {"role": "user", "content": "Summarise this text in two sentences."},
//!             ],
//!             "text": {"format": {"type": "json_object"}},
//!         }),
//!         &RequestOptions::default(),
//!     )
//!     .await;
//!
//! if let Some(decoded) = decode_json(&outcome) {
//!     // ...
//! }
//! # }
//! ```
//!
//! A typical successful payload (truncated):
//!
//! ```json
//! {
//!   "id": "resp_xxx",
//!   "status": "completed",
//!   "output": [
//!     {"type": "reasoning", "summary": []},
//!     {"type": "message", "content": [{"type": "output_text", "text": "Your final answer here."}]}
//!   ],
//!   "usage": { "input_tokens": 123, "output_tokens": 456 }
//! }
//! ```

mod client;
mod config;
mod error;
mod extract;
mod poll;
mod transport;
mod types;

pub use client::AiProxyClient;
pub use config::ProxyConfig;
pub use error::{AiProxyError, AiProxyResult};
pub use extract::{decode_json, extract_text};
pub use types::{Body, Completion, PollOptions, RequestOptions};
