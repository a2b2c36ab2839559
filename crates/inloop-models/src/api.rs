//! Request and response bodies of the HTTP API.
//!
//! Field names are camelCase on the wire. Incoming bodies are first decoded
//! into the lenient `Raw*` shapes and then validated into the typed requests,
//! so a bad field yields a [`ModelError`] instead of a generic decode failure.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::interrupt::{InterruptOptions, InterruptPrompt};
use crate::message::{Message, Role};
use crate::thread::ThreadId;

// ---------------------------------------------------------------------------
// Mode / TaskType
// ---------------------------------------------------------------------------

/// Whether a graph request begins a new backend run or continues a paused one.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Begin a new run on the thread.
    Start,
    /// Answer the pending interrupt of a paused run.
    Resume,
}

/// Kind of work the backend should do for a new run.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskType {
    /// Let the backend decide. Never sent on the wire.
    #[default]
    None,
    /// Essay writing.
    Essay,
    /// Code generation.
    Code,
}

impl TaskType {
    /// The value to put in `taskType`, or `None` when the field is omitted.
    pub fn on_wire(self) -> Option<Self> {
        match self {
            Self::None => None,
            other => Some(other),
        }
    }
}

// ---------------------------------------------------------------------------
// WireMessage
// ---------------------------------------------------------------------------

/// A message as exchanged over HTTP: role and content only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WireMessage {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl WireMessage {
    /// An assistant message with the given content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// /api/graph
// ---------------------------------------------------------------------------

/// Body of `POST /api/graph`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphRequest {
    /// Thread the run belongs to.
    pub thread_id: ThreadId,
    /// User text (prompt for `start`, answer for `resume`).
    pub message: String,
    /// Start or resume.
    pub mode: Mode,
    /// Task hint, only meaningful for `start`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
}

impl GraphRequest {
    /// A request beginning a new run. `TaskType::None` is left off the wire.
    pub fn start(thread_id: ThreadId, message: impl Into<String>, task_type: TaskType) -> Self {
        Self {
            thread_id,
            message: message.into(),
            mode: Mode::Start,
            task_type: task_type.on_wire(),
        }
    }

    /// A request answering the pending interrupt of a run.
    pub fn resume(thread_id: ThreadId, message: impl Into<String>) -> Self {
        Self {
            thread_id,
            message: message.into(),
            mode: Mode::Resume,
            task_type: None,
        }
    }
}

/// Untrusted body of `POST /api/graph` before validation.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawGraphRequest {
    /// Thread id as sent.
    pub thread_id: Option<String>,
    /// Message as sent.
    pub message: Option<String>,
    /// Mode as sent.
    pub mode: Option<String>,
    /// Task type as sent.
    pub task_type: Option<String>,
}

impl RawGraphRequest {
    /// Check required fields and parse the enums.
    pub fn validate(self) -> Result<GraphRequest, ModelError> {
        let thread_id = non_blank(self.thread_id).ok_or(ModelError::MissingField {
            field: "threadId",
        })?;
        let message =
            non_blank(self.message).ok_or(ModelError::MissingField { field: "message" })?;
        let mode_raw = non_blank(self.mode).ok_or(ModelError::MissingField { field: "mode" })?;
        let mode: Mode = mode_raw
            .parse()
            .map_err(|_| ModelError::InvalidMode { value: mode_raw })?;

        let task_type = match (mode, non_blank(self.task_type)) {
            (Mode::Start, Some(raw)) => raw
                .parse::<TaskType>()
                .map_err(|_| ModelError::InvalidTaskType { value: raw })?
                .on_wire(),
            _ => None,
        };

        Ok(GraphRequest {
            thread_id: ThreadId::from(thread_id),
            message,
            mode,
            task_type,
        })
    }
}

/// Successful reply of `POST /api/graph`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GraphReply {
    /// The assistant text: the final draft, or the interrupt question.
    pub message: WireMessage,
    /// `true` when the run paused for clarification.
    #[serde(default)]
    pub interrupt: bool,
    /// Suggested answers for an interrupt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<InterruptOptions>,
}

impl GraphReply {
    /// Reply for a paused run.
    pub fn interrupt(question: impl Into<String>, options: Option<InterruptOptions>) -> Self {
        Self {
            message: WireMessage::assistant(question),
            interrupt: true,
            options,
        }
    }

    /// Reply for a finished run.
    pub fn final_answer(content: impl Into<String>) -> Self {
        Self {
            message: WireMessage::assistant(content),
            interrupt: false,
            options: None,
        }
    }

    /// The clarification prompt carried by this reply, if it is an interrupt.
    pub fn prompt(&self) -> Option<InterruptPrompt> {
        self.interrupt.then(|| {
            let question = Some(self.message.content.clone()).filter(|q| !q.is_empty());
            InterruptPrompt::new(question, self.options.clone())
        })
    }
}

// ---------------------------------------------------------------------------
// /api/chat
// ---------------------------------------------------------------------------

/// Body of `POST /api/chat`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    /// Full conversation history, oldest first.
    pub messages: Vec<WireMessage>,
    /// Caller's provider API key.
    pub api_key: String,
}

/// Untrusted body of `POST /api/chat` before validation.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCompletionRequest {
    /// History as sent; must be an array.
    pub messages: Option<serde_json::Value>,
    /// API key as sent.
    pub api_key: Option<String>,
}

impl RawCompletionRequest {
    /// Check the API key and the shape of the history.
    pub fn validate(self) -> Result<CompletionRequest, ModelError> {
        let api_key = non_blank(self.api_key).ok_or(ModelError::MissingField { field: "apiKey" })?;
        let Some(serde_json::Value::Array(entries)) = self.messages else {
            return Err(ModelError::MissingField { field: "messages" });
        };
        let messages = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value::<WireMessage>(entry).map_err(|e| {
                    ModelError::InvalidMessage {
                        index,
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompletionRequest { messages, api_key })
    }
}

/// Successful reply of `POST /api/chat`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionReply {
    /// The assistant's answer.
    pub message: WireMessage,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON error envelope returned with every non-2xx status.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable message for the error banner.
    pub error: String,
    /// Machine-readable diagnostic tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Backend URL the server tried to reach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
}

impl ErrorBody {
    /// An envelope carrying only a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hint: None,
            backend: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn start_request_omits_task_type_none() {
        let req = GraphRequest::start(ThreadId::new("t1"), "hi", TaskType::None);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"threadId": "t1", "message": "hi", "mode": "start"}));
    }

    #[test]
    fn start_request_carries_task_type() {
        let req = GraphRequest::start(ThreadId::new("t1"), "Write an essay", TaskType::Essay);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["taskType"], "essay");
        assert_eq!(value["threadId"], "t1");
    }

    #[test]
    fn resume_request_never_has_task_type() {
        let value = serde_json::to_value(GraphRequest::resume(ThreadId::new("t1"), "history")).unwrap();
        assert_eq!(value["mode"], "resume");
        assert!(value.get("taskType").is_none());
    }

    #[test]
    fn raw_graph_request_validates() {
        let raw: RawGraphRequest = serde_json::from_value(json!({
            "threadId": "t1", "message": "Write an essay", "mode": "start", "taskType": "essay"
        }))
        .unwrap();
        let req = raw.validate().unwrap();
        assert_eq!(req, GraphRequest::start(ThreadId::new("t1"), "Write an essay", TaskType::Essay));
    }

    #[test]
    fn raw_graph_request_missing_fields() {
        let raw: RawGraphRequest =
            serde_json::from_value(json!({"threadId": "t1", "message": "  ", "mode": "start"}))
                .unwrap();
        assert_eq!(raw.validate(), Err(ModelError::MissingField { field: "message" }));

        let raw: RawGraphRequest = serde_json::from_value(json!({"message": "x", "mode": "start"})).unwrap();
        assert_eq!(raw.validate(), Err(ModelError::MissingField { field: "threadId" }));
    }

    #[test]
    fn raw_graph_request_rejects_unknown_mode() {
        let raw = RawGraphRequest {
            thread_id: Some("t1".into()),
            message: Some("x".into()),
            mode: Some("pause".into()),
            task_type: None,
        };
        assert_eq!(
            raw.validate(),
            Err(ModelError::InvalidMode { value: "pause".into() })
        );
    }

    #[test]
    fn resume_ignores_task_type() {
        let raw = RawGraphRequest {
            thread_id: Some("t1".into()),
            message: Some("history".into()),
            mode: Some("resume".into()),
            task_type: Some("essay".into()),
        };
        assert_eq!(raw.validate().unwrap().task_type, None);
    }

    #[test]
    fn interrupt_reply_exposes_prompt() {
        let reply: GraphReply = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "Which topic?"},
            "interrupt": true,
            "options": null
        }))
        .unwrap();
        let prompt = reply.prompt().unwrap();
        assert_eq!(prompt.question, "Which topic?");
        assert!(prompt.options.is_none());
    }

    #[test]
    fn final_reply_has_no_prompt() {
        let reply: GraphReply = serde_json::from_value(json!({
            "message": {"role": "assistant", "content": "Done."}
        }))
        .unwrap();
        assert!(!reply.interrupt);
        assert!(reply.prompt().is_none());
    }

    #[test]
    fn raw_completion_request_requires_key_then_array() {
        let raw: RawCompletionRequest = serde_json::from_value(json!({"messages": []})).unwrap();
        assert_eq!(raw.validate(), Err(ModelError::MissingField { field: "apiKey" }));

        let raw: RawCompletionRequest =
            serde_json::from_value(json!({"messages": "hello", "apiKey": "sk-1"})).unwrap();
        assert_eq!(raw.validate(), Err(ModelError::MissingField { field: "messages" }));

        let raw: RawCompletionRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hello"}], "apiKey": "sk-1"
        }))
        .unwrap();
        let req = raw.validate().unwrap();
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.api_key, "sk-1");
    }

    #[test]
    fn raw_completion_request_accepts_system_role() {
        let raw: RawCompletionRequest = serde_json::from_value(json!({
            "messages": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "hello"}
            ],
            "apiKey": "sk-1"
        }))
        .unwrap();
        let req = raw.validate().unwrap();
        assert_eq!(req.messages[0].role, Role::System);
    }

    #[test]
    fn raw_completion_request_names_bad_entry() {
        let raw: RawCompletionRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hello"}, {"role": "robot", "content": "x"}],
            "apiKey": "sk-1"
        }))
        .unwrap();
        assert!(matches!(
            raw.validate(),
            Err(ModelError::InvalidMessage { index: 1, .. })
        ));
    }

    #[test]
    fn error_body_skips_empty_diagnostics() {
        let value = serde_json::to_value(ErrorBody::new("boom")).unwrap();
        assert_eq!(value, json!({"error": "boom"}));
    }
}
