//! Client configuration resolved from the process environment.

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::time::Duration;

use log::warn;

/// Default base URL prefixed to relative proxy paths.
const DEFAULT_BASE_URL: &str = "https://flatlogic.com";
/// Default header name carrying the project UUID.
const DEFAULT_PROJECT_HEADER: &str = "project-uuid";
/// Default model used when the caller does not pick one.
const DEFAULT_MODEL: &str = "gpt-5-mini";
/// Default per-call HTTP timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Fallback key-value file consulted for variables the environment lacks.
const FALLBACK_ENV_FILE: &str = ".env";

/// Immutable client configuration.
///
/// Resolved once (normally via [`ProxyConfig::from_env`]) and handed to
/// [`AiProxyClient::new`](crate::AiProxyClient::new); nothing in the crate
/// mutates it afterwards. Tests construct arbitrary values directly instead
/// of overriding a hidden process-wide cache.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL prefixed to relative proxy paths.
    pub base_url: String,
    /// Submit endpoint path; derived from `project_id` when not set
    /// explicitly.
    pub responses_path: Option<String>,
    /// Project id used to derive the default submit path.
    pub project_id: Option<String>,
    /// Project UUID; required for every call.
    pub project_uuid: Option<String>,
    /// Header name carrying the project UUID.
    pub project_header: String,
    /// Model filled in when the caller omits one.
    pub default_model: String,
    /// Default per-call HTTP timeout.
    pub timeout: Duration,
    /// Default TLS certificate verification.
    pub verify_tls: bool,
}

impl ProxyConfig {
    /// Resolve the configuration from the process environment, consulting
    /// `.env` in the working directory for variables the environment does
    /// not define.
    pub fn from_env() -> Self {
        Self::from_env_with_fallback(Path::new(FALLBACK_ENV_FILE))
    }

    /// Same as [`ProxyConfig::from_env`], with an explicit fallback file
    /// path.
    ///
    /// The fallback file is consulted only when `PROJECT_ID` or
    /// `PROJECT_UUID` is absent from the environment, and a file value is
    /// used only for keys the environment leaves unset. A missing or
    /// unreadable file is a silent no-op. The process environment is never
    /// mutated.
    pub fn from_env_with_fallback(fallback: &Path) -> Self {
        let env_vars: HashMap<String, String> = env::vars().collect();
        let file_vars = if needs_fallback(&env_vars) {
            load_fallback_file(fallback)
        } else {
            HashMap::new()
        };
        Self::resolve(&env_vars, &file_vars)
    }

    fn resolve(env_vars: &HashMap<String, String>, file_vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            lookup(env_vars, key).or_else(|| lookup(file_vars, key))
        };

        let project_id = get("PROJECT_ID");
        let responses_path = get("AI_RESPONSES_PATH").or_else(|| {
            project_id
                .as_ref()
                .map(|id| format!("/projects/{id}/ai-request"))
        });

        Self {
            base_url: get("AI_PROXY_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            responses_path,
            project_uuid: get("PROJECT_UUID"),
            project_header: get("AI_PROJECT_HEADER")
                .unwrap_or_else(|| DEFAULT_PROJECT_HEADER.to_string()),
            default_model: get("AI_DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parse_timeout(get("AI_TIMEOUT"))),
            verify_tls: parse_verify_tls(get("AI_VERIFY_TLS")),
            project_id,
        }
    }
}

fn lookup(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|value| !value.is_empty()).cloned()
}

/// The fallback file matters only when the project identifiers are not
/// already present in the environment.
fn needs_fallback(env_vars: &HashMap<String, String>) -> bool {
    lookup(env_vars, "PROJECT_ID").is_none() || lookup(env_vars, "PROJECT_UUID").is_none()
}

/// Parse a `KEY=VALUE` file: blank lines and `#` comments skipped,
/// surrounding quotes trimmed. Unreadable files yield an empty map.
fn load_fallback_file(path: &Path) -> HashMap<String, String> {
    let Ok(entries) = dotenvy::from_path_iter(path) else {
        return HashMap::new();
    };
    entries.filter_map(|entry| entry.ok()).collect()
}

fn parse_timeout(raw: Option<String>) -> u64 {
    match raw {
        None => DEFAULT_TIMEOUT_SECS,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("invalid AI_TIMEOUT value {value:?}, using default {DEFAULT_TIMEOUT_SECS}s");
            DEFAULT_TIMEOUT_SECS
        }),
    }
}

fn parse_verify_tls(raw: Option<String>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let normalized = value.to_lowercase();
            if !matches!(normalized.as_str(), "0" | "1" | "false" | "true" | "no" | "yes") {
                warn!("unrecognized AI_VERIFY_TLS value {value:?}, verification stays on");
            }
            !matches!(normalized.as_str(), "0" | "false" | "no")
        }
    }
}
