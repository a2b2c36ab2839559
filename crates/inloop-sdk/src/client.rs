//! HTTP client for the In-the-Loop API server.
//!
//! [`ApiClient`] posts JSON to `/api/graph` and `/api/chat` and turns the
//! server's `{error}` envelope into [`SdkError::Api`].

use async_trait::async_trait;
use inloop_models::{CompletionReply, CompletionRequest, ErrorBody, GraphReply, GraphRequest};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::SdkError;
use crate::transport::ChatTransport;

const GRAPH_PATH: &str = "/api/graph";
const CHAT_PATH: &str = "/api/chat";

/// Reqwest-backed client for one API server.
///
/// Cheap to clone: `reqwest::Client` is reference-counted internally.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str) -> Result<Self, SdkError> {
        let base_url = base_url.trim().trim_end_matches('/');
        reqwest::Url::parse(base_url)
            .map_err(|e| SdkError::Config(format!("invalid server URL \"{base_url}\": {e}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
        })
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B, fallback: &str) -> Result<R, SdkError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "posting request");

        let res = self.http.post(&url).json(body).send().await?;
        let status = res.status();

        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| fallback.to_string());
            return Err(SdkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn graph(&self, request: &GraphRequest) -> Result<GraphReply, SdkError> {
        self.post_json(GRAPH_PATH, request, "Failed to send message")
            .await
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, SdkError> {
        self.post_json(CHAT_PATH, request, "Failed to get a completion")
            .await
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use inloop_models::{TaskType, ThreadId};
    use serde_json::{json, Value};

    use super::*;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(SdkError::Config(_))));
    }

    #[test]
    fn strips_trailing_slash() {
        let client = ApiClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[tokio::test]
    async fn graph_posts_camel_case_body() {
        let app = Router::new().route(
            "/api/graph",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["threadId"], "t1");
                assert_eq!(body["taskType"], "code");
                Json(json!({
                    "message": {"role": "assistant", "content": "fn main() {}"},
                    "interrupt": false
                }))
            }),
        );
        let client = ApiClient::new(&spawn(app).await).unwrap();

        let reply = client
            .graph(&GraphRequest::start(ThreadId::new("t1"), "hello world", TaskType::Code))
            .await
            .unwrap();
        assert_eq!(reply.message.content, "fn main() {}");
        assert!(!reply.interrupt);
    }

    #[tokio::test]
    async fn error_envelope_becomes_api_error() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({"error": "API quota exceeded"})),
                )
            }),
        );
        let client = ApiClient::new(&spawn(app).await).unwrap();

        let err = client
            .complete(&CompletionRequest {
                messages: vec![],
                api_key: "sk-test".into(),
            })
            .await
            .unwrap_err();
        match err {
            SdkError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "API quota exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_error_body_uses_fallback() {
        let app = Router::new().route(
            "/api/graph",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let client = ApiClient::new(&spawn(app).await).unwrap();

        let err = client
            .graph(&GraphRequest::resume(ThreadId::new("t1"), "yes"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to send message");
    }
}
