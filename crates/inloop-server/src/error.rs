//! Error types for the API server.
//!
//! [`ApiError`] unifies all failure modes of both routes and implements
//! [`axum::response::IntoResponse`] so handlers can return
//! `Result<…, ApiError>` directly. Every error is rendered as an
//! [`ErrorBody`] envelope.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use inloop_models::{ErrorBody, ModelError};

/// Diagnostic tag attached when the graph backend could not be reached.
pub const BACKEND_FETCH_FAILED: &str = "backend_fetch_failed";

/// Errors that can occur while proxying a request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is malformed or misses a required field.
    #[error("{0}")]
    Validation(String),

    /// The provider rejected the caller's API key.
    #[error("Invalid API key provided")]
    InvalidApiKey,

    /// The caller's provider account is out of quota.
    #[error("API quota exceeded")]
    QuotaExceeded,

    /// Any other provider failure. `detail` is logged, not returned.
    #[error("Failed to get response from OpenAI")]
    Provider {
        /// What actually went wrong.
        detail: String,
    },

    /// The provider answered without any completion text.
    #[error("No response from OpenAI")]
    EmptyCompletion,

    /// The graph backend could not be reached (after retries) or sent an
    /// unreadable body.
    #[error("{message}")]
    BackendUnreachable {
        /// Last transport error.
        message: String,
        /// Backend base URL that was tried.
        backend: String,
    },

    /// The graph backend answered with a non-2xx status.
    #[error("{0}")]
    BackendRejected(String),

    /// The graph backend answered 2xx with an unknown payload shape.
    #[error("{0}")]
    UnexpectedReply(String),
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        let message = match err {
            ModelError::MissingField { field: "apiKey" } => "API key is required".to_string(),
            ModelError::MissingField { field: "messages" } => {
                "Messages array is required".to_string()
            }
            ModelError::MissingField { .. } => {
                "threadId, message, and mode are required".to_string()
            }
            other => other.to_string(),
        };
        Self::Validation(message)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidApiKey => StatusCode::UNAUTHORIZED,
            Self::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Provider { .. }
            | Self::EmptyCompletion
            | Self::BackendUnreachable { .. }
            | Self::BackendRejected(_)
            | Self::UnexpectedReply(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut body = ErrorBody::new(self.to_string());

        match &self {
            Self::Provider { detail } => {
                tracing::error!(%status, error = %body.error, %detail, "request failed");
            }
            Self::BackendUnreachable { backend, .. } => {
                tracing::error!(%status, error = %body.error, %backend, "request failed");
                body.hint = Some(BACKEND_FETCH_FAILED.to_string());
                body.backend = Some(backend.clone());
            }
            _ => tracing::error!(%status, error = %body.error, "request failed"),
        }

        (status, Json(body)).into_response()
    }
}
