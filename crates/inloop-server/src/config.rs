//! Server configuration.
//!
//! Built once from environment variables at startup and injected into Axum
//! handlers via [`axum::extract::State`].

use std::time::Duration;

/// Graph backend used in development when `PY_BACKEND_URL` is unset.
pub const DEV_BACKEND_URL: &str = "http://127.0.0.1:8000";
/// Graph backend used everywhere else when `PY_BACKEND_URL` is unset.
pub const HOSTED_BACKEND_URL: &str = "https://in-the-loop-python.onrender.com";
/// Default LLM provider endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Retry schedule for calls to the graph backend.
///
/// An attempt that fails at the network level (or exceeds
/// `attempt_timeout`) is retried after the next delay in `backoff`; when the
/// schedule is exhausted the failure is surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before each retry, in order.
    pub backoff: Vec<Duration>,
    /// Upper bound for a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff: vec![Duration::from_millis(500), Duration::from_millis(1500)],
            attempt_timeout: Duration::from_secs(15),
        }
    }
}

/// Global configuration shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the graph backend, as configured.
    pub backend_url: String,
    /// Base URL of the OpenAI-compatible provider.
    pub provider_base_url: String,
    /// Port to listen on (default `3000`).
    pub listen_port: u16,
    /// Retry schedule for the graph backend.
    pub retry: RetryPolicy,
}

impl AppConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable          | Default                     | Description                          |
    /// |-------------------|-----------------------------|--------------------------------------|
    /// | `PY_BACKEND_URL`  | depends on `INLOOP_ENV`     | Graph backend base URL               |
    /// | `INLOOP_ENV`      | `production`                | `development` selects localhost      |
    /// | `OPENAI_BASE_URL` | `https://api.openai.com/v1` | LLM provider base URL                |
    /// | `PORT`            | `3000`                      | HTTP listen port                     |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let set = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let development = set("INLOOP_ENV").is_some_and(|env| env == "development");
        let backend_url = set("PY_BACKEND_URL").unwrap_or_else(|| {
            if development {
                DEV_BACKEND_URL.to_string()
            } else {
                HOSTED_BACKEND_URL.to_string()
            }
        });

        let provider_base_url =
            set("OPENAI_BASE_URL").unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        let listen_port: u16 = set("PORT").and_then(|v| v.parse().ok()).unwrap_or(3000);

        Self {
            backend_url,
            provider_base_url,
            listen_port,
            retry: RetryPolicy::default(),
        }
    }

    /// Full URL of a graph backend endpoint such as `/start`.
    pub fn backend_endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.backend_url.trim_end_matches('/'))
    }

    /// Full URL of a provider endpoint such as `/chat/completions`.
    pub fn provider_endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.provider_base_url.trim_end_matches('/'))
    }
}
