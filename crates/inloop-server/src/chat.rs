//! `POST /api/chat`: direct LLM completion.
//!
//! Validates the caller's API key and history, forwards them to the
//! OpenAI-compatible `/chat/completions` endpoint and returns the first
//! choice. Provider error codes are mapped onto HTTP statuses; there is no
//! retry.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use inloop_models::{CompletionReply, CompletionRequest, RawCompletionRequest, WireMessage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::error::ApiError;

const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f32 = 0.7;

// ---------------------------------------------------------------------------
// Provider wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ProviderRequest<'a> {
    model: &'a str,
    messages: &'a [WireMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    choices: Vec<ProviderChoice>,
}

#[derive(Deserialize)]
struct ProviderChoice {
    message: Option<ProviderMessage>,
}

#[derive(Deserialize)]
struct ProviderMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// `POST /api/chat`: forward a conversation to the LLM provider.
pub async fn chat_completion(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CompletionReply>, ApiError> {
    let raw: RawCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::Validation(format!("invalid JSON body: {e}")))?;
    let request = raw.validate()?;

    info!(messages = request.messages.len(), "forwarding chat completion");
    let content = complete(&state.http, &state.config, &request).await?;

    Ok(Json(CompletionReply {
        message: WireMessage::assistant(content),
    }))
}

/// Call the provider and extract the first completion's text.
async fn complete(
    http: &reqwest::Client,
    config: &AppConfig,
    request: &CompletionRequest,
) -> Result<String, ApiError> {
    let provider_error = |e: reqwest::Error| ApiError::Provider {
        detail: e.to_string(),
    };

    let res = http
        .post(config.provider_endpoint("/chat/completions"))
        .bearer_auth(&request.api_key)
        .json(&ProviderRequest {
            model: MODEL,
            messages: &request.messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        })
        .send()
        .await
        .map_err(provider_error)?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(map_provider_error(status.as_u16(), &text));
    }

    let body: ProviderResponse = res.json().await.map_err(provider_error)?;
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.is_empty())
        .ok_or(ApiError::EmptyCompletion)
}

/// Translate a provider error body into an [`ApiError`].
fn map_provider_error(status: u16, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ProviderErrorEnvelope>(body).ok();
    match detail.as_ref().and_then(|d| d.error.code.as_deref()) {
        Some("invalid_api_key") => ApiError::InvalidApiKey,
        Some("insufficient_quota") => ApiError::QuotaExceeded,
        _ => {
            let message = detail
                .and_then(|d| d.error.message)
                .unwrap_or_else(|| body.to_string());
            ApiError::Provider {
                detail: format!("provider returned {status}: {message}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::{config, server, spawn_upstream};

    fn history() -> Value {
        json!({
            "messages": [{"role": "user", "content": "Hello"}],
            "apiKey": "sk-test"
        })
    }

    async fn provider_replying(status: StatusCode, body: Value) -> String {
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let body = body.clone();
                async move { (status, Json(body)) }
            }),
        );
        spawn_upstream(app).await
    }

    #[test]
    fn unknown_provider_code_is_generic() {
        let err = map_provider_error(500, r#"{"error": {"code": "server_error", "message": "oops"}}"#);
        assert!(matches!(err, ApiError::Provider { ref detail } if detail.contains("oops")));
        assert!(matches!(map_provider_error(502, "bad gateway"), ApiError::Provider { .. }));
    }

    #[tokio::test]
    async fn forwards_history_and_returns_first_choice() {
        let app = Router::new().route(
            "/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer sk-test");
                assert_eq!(body["model"], MODEL);
                assert_eq!(body["max_tokens"], MAX_TOKENS);
                assert_eq!(body["messages"][0]["content"], "Hello");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Hi there!"}}]
                }))
            }),
        );
        let provider = spawn_upstream(app).await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server.post("/api/chat").json(&history()).await;
        res.assert_status_ok();
        res.assert_json(&json!({"message": {"role": "assistant", "content": "Hi there!"}}));
    }

    #[tokio::test]
    async fn system_messages_are_passed_through() {
        let app = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "Hi."}}]
                }))
            }),
        );
        let provider = spawn_upstream(app).await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server
            .post("/api/chat")
            .json(&json!({
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Hello"}
                ],
                "apiKey": "sk-test"
            }))
            .await;
        res.assert_status_ok();
    }

    #[tokio::test]
    async fn malformed_history_entry_is_named() {
        let server = server(config("http://127.0.0.1:1", "http://127.0.0.1:1"));
        let res = server
            .post("/api/chat")
            .json(&json!({"messages": [{"content": "no role"}], "apiKey": "sk-test"}))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert!(body["error"].as_str().is_some_and(|e| e.starts_with("invalid message at index 0")));
    }

    #[tokio::test]
    async fn missing_api_key_is_bad_request() {
        let server = server(config("http://127.0.0.1:1", "http://127.0.0.1:1"));
        let res = server
            .post("/api/chat")
            .json(&json!({"messages": []}))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        res.assert_json(&json!({"error": "API key is required"}));
    }

    #[tokio::test]
    async fn missing_messages_is_bad_request() {
        let server = server(config("http://127.0.0.1:1", "http://127.0.0.1:1"));
        let res = server
            .post("/api/chat")
            .json(&json!({"apiKey": "sk-test"}))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        res.assert_json(&json!({"error": "Messages array is required"}));
    }

    #[tokio::test]
    async fn invalid_key_maps_to_unauthorized() {
        let provider = provider_replying(
            StatusCode::UNAUTHORIZED,
            json!({"error": {"code": "invalid_api_key", "message": "Incorrect API key"}}),
        )
        .await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server.post("/api/chat").json(&history()).await;
        res.assert_status(StatusCode::UNAUTHORIZED);
        res.assert_json(&json!({"error": "Invalid API key provided"}));
    }

    #[tokio::test]
    async fn quota_maps_to_too_many_requests() {
        let provider = provider_replying(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": "insufficient_quota", "message": "You exceeded your quota"}}),
        )
        .await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server.post("/api/chat").json(&history()).await;
        res.assert_status(StatusCode::TOO_MANY_REQUESTS);
        res.assert_json(&json!({"error": "API quota exceeded"}));
    }

    #[tokio::test]
    async fn other_provider_failures_are_internal_errors() {
        let provider = provider_replying(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": {"code": null, "message": "overloaded"}}),
        )
        .await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server.post("/api/chat").json(&history()).await;
        res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        res.assert_json(&json!({"error": "Failed to get response from OpenAI"}));
    }

    #[tokio::test]
    async fn empty_completion_is_internal_error() {
        let provider = provider_replying(StatusCode::OK, json!({"choices": []})).await;
        let server = server(config("http://127.0.0.1:1", &provider));

        let res = server.post("/api/chat").json(&history()).await;
        res.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        res.assert_json(&json!({"error": "No response from OpenAI"}));
    }
}
