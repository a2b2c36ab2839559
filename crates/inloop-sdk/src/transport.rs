//! The network seam of the conversation controller.

use async_trait::async_trait;
use inloop_models::{CompletionReply, CompletionRequest, GraphReply, GraphRequest};

use crate::error::SdkError;

/// Something that can carry graph and completion requests to the server.
///
/// [`ApiClient`](crate::ApiClient) is the HTTP implementation; tests plug in
/// scripted transports.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a start/resume request to the graph backend.
    async fn graph(&self, request: &GraphRequest) -> Result<GraphReply, SdkError>;

    /// Send the conversation history to the direct completion endpoint.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionReply, SdkError>;
}
