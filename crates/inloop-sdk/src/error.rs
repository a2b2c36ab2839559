//! SDK error types.
//!
//! [`SdkError`] is the single error type returned by every fallible
//! operation in the SDK. Its `Display` text is what ends up in the
//! conversation's error banner.

/// Error type for all SDK operations.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// Invalid client configuration (e.g. a malformed base URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// The server answered with a non-2xx status and an error envelope.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The `error` field of the envelope.
        message: String,
    },

    /// Transport failure before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization / deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_displays_server_message_only() {
        let err = SdkError::Api {
            status: 429,
            message: "API quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "API quota exceeded");
    }
}
