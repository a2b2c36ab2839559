//! Error types for the `inloop-models` crate.
//!
//! Boundary validation in [`crate::api`] returns variants of [`ModelError`].

/// Errors produced when validating loosely-typed request bodies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A required field was absent or blank.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the missing field.
        field: &'static str,
    },

    /// The `mode` field held something other than `start` or `resume`.
    #[error("invalid mode \"{value}\": expected start or resume")]
    InvalidMode {
        /// The value that failed validation.
        value: String,
    },

    /// The `taskType` field held an unknown task.
    #[error("invalid task type \"{value}\": expected none, essay or code")]
    InvalidTaskType {
        /// The value that failed validation.
        value: String,
    },

    /// The history array held an entry that is not `{role, content}`.
    #[error("invalid message at index {index}: {reason}")]
    InvalidMessage {
        /// Position of the offending entry.
        index: usize,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_missing_field() {
        let err = ModelError::MissingField { field: "threadId" };
        assert_eq!(err.to_string(), "missing required field: threadId");
    }

    #[test]
    fn error_display_invalid_mode() {
        let err = ModelError::InvalidMode {
            value: "pause".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid mode \"pause\": expected start or resume"
        );
    }

    #[test]
    fn error_display_invalid_message() {
        let err = ModelError::InvalidMessage {
            index: 2,
            reason: "unknown variant `robot`".into(),
        };
        assert_eq!(err.to_string(), "invalid message at index 2: unknown variant `robot`");
    }
}
