//! `POST /api/graph`: graph backend proxy.
//!
//! A `start` request becomes `POST {backend}/start`, a `resume` request
//! `POST {backend}/resume`. Network failures are retried on the schedule in
//! [`RetryPolicy`]; each attempt is bounded by its own timeout. The backend's
//! `{type: interrupt | final}` replies are validated and translated into a
//! [`GraphReply`].

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use inloop_models::{
    DEFAULT_INTERRUPT_QUESTION, GraphReply, GraphRequest, InterruptOptions, Mode, RawGraphRequest,
    TaskType,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AppState;
use crate::config::{AppConfig, RetryPolicy};
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Backend wire types
// ---------------------------------------------------------------------------

/// Body sent to the graph backend.
#[derive(Serialize, Debug, PartialEq)]
#[serde(untagged)]
enum BackendRequest<'a> {
    Start {
        thread_id: &'a str,
        essay_prompt: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        task_type: Option<TaskType>,
    },
    Resume {
        thread_id: &'a str,
        value: &'a str,
    },
}

impl<'a> BackendRequest<'a> {
    fn from_request(request: &'a GraphRequest) -> Self {
        match request.mode {
            Mode::Start => Self::Start {
                thread_id: request.thread_id.as_str(),
                essay_prompt: &request.message,
                task_type: request.task_type,
            },
            Mode::Resume => Self::Resume {
                thread_id: request.thread_id.as_str(),
                value: &request.message,
            },
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::Start { .. } => "/start",
            Self::Resume { .. } => "/resume",
        }
    }
}

/// A successful backend reply.
#[derive(Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum BackendReply {
    Interrupt {
        #[serde(default)]
        query: Option<String>,
        #[serde(default)]
        options: Option<InterruptOptions>,
    },
    Final {
        draft: String,
    },
}

impl From<BackendReply> for GraphReply {
    fn from(reply: BackendReply) -> Self {
        match reply {
            BackendReply::Interrupt { query, options } => GraphReply::interrupt(
                query.unwrap_or_else(|| DEFAULT_INTERRUPT_QUESTION.to_string()),
                options,
            ),
            BackendReply::Final { draft } => GraphReply::final_answer(draft),
        }
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// `POST /api/graph`: start or resume a run on the graph backend.
pub async fn graph_proxy(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GraphReply>, ApiError> {
    let raw: RawGraphRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))?;
    let request = raw.validate()?;

    info!(
        thread = %request.thread_id,
        mode = %request.mode,
        task = ?request.task_type,
        "forwarding graph request"
    );

    forward(&state.http, &state.config, &request).await.map(Json)
}

/// Send `request` to the backend and translate its reply.
async fn forward(
    http: &reqwest::Client,
    config: &AppConfig,
    request: &GraphRequest,
) -> Result<GraphReply, ApiError> {
    let body = BackendRequest::from_request(request);
    let url = config.backend_endpoint(body.path());
    let unreachable = |message: String| ApiError::BackendUnreachable {
        message,
        backend: config.backend_url.clone(),
    };

    let res = with_retry(&config.retry, |_| http.post(&url).json(&body).send())
        .await
        .map_err(unreachable)?;

    let status = res.status();
    let bytes = res.bytes().await.map_err(|e| unreachable(e.to_string()))?;
    let data: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| unreachable(e.to_string()))?;

    if !status.is_success() {
        let detail = match data.get("detail") {
            Some(serde_json::Value::String(detail)) => detail.clone(),
            Some(serde_json::Value::Null) | None => "Backend error".to_string(),
            Some(other) => other.to_string(),
        };
        return Err(ApiError::BackendRejected(detail));
    }

    match serde_json::from_value::<BackendReply>(data.clone()) {
        Ok(reply) => Ok(reply.into()),
        Err(e) => {
            warn!(error = %e, "unexpected backend reply");
            let message = data
                .get("error")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Unexpected backend response");
            Err(ApiError::UnexpectedReply(message.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

/// Run `attempt` until it succeeds or the retry schedule is exhausted.
///
/// Each call is raced against `policy.attempt_timeout`; a timed-out attempt
/// is dropped (cancelling the outbound request) and counts as a failure.
/// Returns the last error message on exhaustion.
async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut attempt: F) -> Result<T, String>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut n = 0;
    loop {
        let error = match tokio::time::timeout(policy.attempt_timeout, attempt(n)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!(
                "request timed out after {}ms",
                policy.attempt_timeout.as_millis()
            ),
        };

        let Some(delay) = policy.backoff.get(n) else {
            return Err(error);
        };
        warn!(attempt = n + 1, error = %error, ?delay, "backend attempt failed, retrying");
        tokio::time::sleep(*delay).await;
        n += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
