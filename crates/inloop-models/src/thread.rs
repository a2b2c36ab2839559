//! Conversation thread identity.
//!
//! The graph backend keeps one run per thread. The client mints a
//! [`ThreadId`] when a conversation starts, sends it with every request so a
//! paused run can be resumed, and mints a new one on "new chat".

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a backend conversation thread.
///
/// # Examples
///
/// ```
/// use inloop_models::ThreadId;
///
/// let id = ThreadId::new("t1");
/// assert_eq!(id.as_str(), "t1");
/// assert_ne!(ThreadId::generate(), ThreadId::generate());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Wrap an existing identifier.
    pub fn new(id: &str) -> Self {
        Self(id.to_string())
    }

    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let id = ThreadId::new("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
