//! Proxy client error types.

use serde_json::Value;
use thiserror::Error;

use crate::types::Body;

/// Result type for proxy operations.
pub type AiProxyResult<T> = Result<T, AiProxyError>;

/// Errors that can occur when talking to the AI proxy.
///
/// Every expected failure is a value of this type; the client does not
/// panic on configuration, transport, or protocol problems.
#[derive(Debug, Error)]
pub enum AiProxyError {
    /// `input` was missing or empty; rejected before any network call.
    #[error("parameter \"input\" is required and must be a non-empty list")]
    InputMissing,

    /// No submit path could be resolved because PROJECT_ID is not configured.
    #[error("PROJECT_ID is not defined; cannot resolve AI proxy endpoint")]
    ProjectIdMissing,

    /// No project UUID configured; required for every call.
    #[error("PROJECT_UUID is not defined; aborting AI request")]
    ProjectUuidMissing,

    /// Transport-level failure: DNS, connect, or timeout.
    #[error("AI proxy request failed: {message}")]
    RequestFailed { message: String },

    /// The proxy answered with a non-2xx status.
    #[error("AI proxy returned {status}: {message}")]
    HttpStatus {
        status: u16,
        message: String,
        /// Decoded-or-raw response body, kept for extraction.
        body: Body,
    },

    /// A deferred request reached the terminal `failed` status.
    #[error("AI request failed: {message}")]
    JobFailed {
        message: String,
        /// The full status payload reported by the proxy.
        data: Value,
    },

    /// The poll deadline passed without a terminal status.
    #[error("timed out waiting for AI response")]
    Timeout,
}

impl AiProxyError {
    /// Stable snake_case identifier matching the proxy protocol taxonomy.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InputMissing => "input_missing",
            Self::ProjectIdMissing => "project_id_missing",
            Self::ProjectUuidMissing => "project_uuid_missing",
            Self::RequestFailed { .. } => "request_failed",
            Self::HttpStatus { .. } => "http_error",
            Self::JobFailed { .. } => "job_failed",
            Self::Timeout => "timeout",
        }
    }

    /// HTTP status associated with the failure, when there is one.
    ///
    /// A terminal `failed` job reports 500, mirroring what the proxy's own
    /// synchronous failure path would have returned.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::JobFailed { .. } => Some(500),
            _ => None,
        }
    }
}
