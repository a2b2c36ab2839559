//! The conversation controller.
//!
//! [`ChatController`] owns the [`ChatState`] aggregate and the current
//! [`ThreadId`]. It decides whether a message starts a new backend run or
//! resumes a paused one, and it folds each reply into the state: an
//! interrupt becomes the transient prompt, anything else is appended to the
//! log as one assistant message.
//!
//! Every send takes an in-flight token. Starting another send, or clearing
//! the conversation, cancels the previous token; a cancelled send returns
//! [`SendOutcome::Superseded`] without touching the state. A send that
//! replaces an unanswered interrupt reply puts that prompt back first, so
//! the paused run is still resumed.

use std::sync::{Mutex, MutexGuard, PoisonError};

use inloop_models::{
    ChatState, CompletionRequest, GraphReply, GraphRequest, InterruptPrompt, Message, TaskType,
    ThreadId, WireMessage,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::SdkError;
use crate::transport::ChatTransport;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// How a send ended, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// An assistant message was appended to the log.
    Replied,
    /// The backend paused; the prompt is in `state().interrupt`.
    Interrupted,
    /// The request failed; the message is also in `state().error`.
    Failed(String),
    /// Blank input, nothing was sent.
    Ignored,
    /// A newer send or a clear replaced this request before it settled.
    Superseded,
}

/// Owns one conversation and talks to the server through `T`.
pub struct ChatController<T> {
    transport: T,
    inner: Mutex<Inner>,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct Inner {
    state: ChatState,
    thread_id: ThreadId,
    in_flight: Option<InFlight>,
    next_token: u64,
}

struct InFlight {
    token: u64,
    cancel: CancellationToken,
    /// Prompt to put back if an interrupt answer fails or is superseded.
    restore_interrupt: Option<InterruptPrompt>,
}

/// A reply reduced to what the state machine cares about.
enum Settled {
    Interrupt(InterruptPrompt),
    Answer {
        content: String,
        clears_interrupt: bool,
    },
}

impl From<GraphReply> for Settled {
    fn from(reply: GraphReply) -> Self {
        match reply.prompt() {
            Some(prompt) => Self::Interrupt(prompt),
            None => Self::Answer {
                content: reply.message.content,
                clears_interrupt: true,
            },
        }
    }
}

impl Inner {
    /// Register a new in-flight request, cancelling the previous one.
    fn begin(&mut self, restore_interrupt: Option<InterruptPrompt>) -> (u64, CancellationToken) {
        self.cancel_in_flight();
        self.next_token += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            token: self.next_token,
            cancel: cancel.clone(),
            restore_interrupt,
        });
        self.state.is_loading = true;
        (self.next_token, cancel)
    }

    /// Cancel the in-flight request and restore the prompt it was answering.
    fn cancel_in_flight(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            debug!(token = previous.token, "cancelling in-flight request");
            previous.cancel.cancel();
            if let Some(prompt) = previous.restore_interrupt {
                self.state.interrupt = Some(prompt);
            }
        }
    }

    /// Take ownership of the in-flight slot if `token` still holds it.
    fn finish(&mut self, token: u64) -> Option<InFlight> {
        match &self.in_flight {
            Some(current) if current.token == token => self.in_flight.take(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ChatController
// ---------------------------------------------------------------------------

impl<T: ChatTransport> ChatController<T> {
    /// A fresh conversation on a newly generated thread.
    pub fn new(transport: T) -> Self {
        Self::with_thread(transport, ThreadId::generate())
    }

    /// A fresh conversation on an existing thread id.
    pub fn with_thread(transport: T, thread_id: ThreadId) -> Self {
        Self {
            transport,
            inner: Mutex::new(Inner {
                state: ChatState::default(),
                thread_id,
                in_flight: None,
                next_token: 0,
            }),
        }
    }

    /// Snapshot of the conversation state.
    pub fn state(&self) -> ChatState {
        self.lock().state.clone()
    }

    /// Current thread id.
    pub fn thread_id(&self) -> ThreadId {
        self.lock().thread_id.clone()
    }

    /// Send a user message to the graph backend.
    ///
    /// The message is appended to the log. If an interrupt is outstanding the
    /// request resumes the paused run, otherwise it starts a new one with
    /// `task_type` as hint.
    pub async fn send_message(&self, content: &str, task_type: TaskType) -> SendOutcome {
        let content = content.trim();
        if content.is_empty() {
            return SendOutcome::Ignored;
        }

        let (token, cancel, request) = {
            let mut inner = self.lock();
            inner.cancel_in_flight();
            let thread_id = inner.thread_id.clone();
            let request = if inner.state.interrupt.is_some() {
                GraphRequest::resume(thread_id, content)
            } else {
                GraphRequest::start(thread_id, content, task_type)
            };
            inner.state.messages.push(Message::user(content));
            inner.state.error = None;
            let (token, cancel) = inner.begin(None);
            (token, cancel, request)
        };
        debug!(token, mode = %request.mode, thread = %request.thread_id, "sending message");

        let result = tokio::select! {
            () = cancel.cancelled() => return Self::discard(token),
            result = self.transport.graph(&request) => result.map(Settled::from),
        };
        self.settle(token, result)
    }

    /// Answer the pending interrupt.
    ///
    /// The prompt is hidden straight away and the answer is sent with mode
    /// `resume`. The answer itself is not logged. A reply that is another
    /// interrupt replaces the prompt; a failed send restores it.
    pub async fn send_interrupt_answer(&self, answer: &str) -> SendOutcome {
        let answer = answer.trim();
        if answer.is_empty() {
            return SendOutcome::Ignored;
        }

        let (token, cancel, request) = {
            let mut inner = self.lock();
            inner.cancel_in_flight();
            let pending = inner.state.interrupt.take();
            let request = GraphRequest::resume(inner.thread_id.clone(), answer);
            let (token, cancel) = inner.begin(pending);
            (token, cancel, request)
        };
        debug!(token, thread = %request.thread_id, "answering interrupt");

        let result = tokio::select! {
            () = cancel.cancelled() => return Self::discard(token),
            result = self.transport.graph(&request) => result.map(Settled::from),
        };
        self.settle(token, result)
    }

    /// Send the whole conversation to the direct completion endpoint.
    ///
    /// Bypasses the graph backend; a pending interrupt is left as is.
    pub async fn send_direct(&self, content: &str, api_key: &str) -> SendOutcome {
        let content = content.trim();
        if content.is_empty() {
            return SendOutcome::Ignored;
        }

        let (token, cancel, request) = {
            let mut inner = self.lock();
            inner.state.messages.push(Message::user(content));
            inner.state.error = None;
            let request = CompletionRequest {
                messages: inner.state.messages.iter().map(WireMessage::from).collect(),
                api_key: api_key.to_string(),
            };
            let (token, cancel) = inner.begin(None);
            (token, cancel, request)
        };
        debug!(token, history = request.messages.len(), "sending direct completion");

        let result = tokio::select! {
            () = cancel.cancelled() => return Self::discard(token),
            result = self.transport.complete(&request) => result.map(|reply| Settled::Answer {
                content: reply.message.content,
                clears_interrupt: false,
            }),
        };
        self.settle(token, result)
    }

    /// Start over: empty log, no error, no interrupt, new thread id.
    ///
    /// Any request still in flight is cancelled and its reply discarded.
    pub fn clear_messages(&self) {
        let mut inner = self.lock();
        inner.cancel_in_flight();
        // Drops any prompt the cancelled request handed back.
        inner.state = ChatState::default();

        let previous = inner.thread_id.clone();
        let mut next = ThreadId::generate();
        while next == previous {
            next = ThreadId::generate();
        }
        debug!(previous = %previous, next = %next, "new chat thread");
        inner.thread_id = next;
    }

    /// Dismiss the error banner.
    pub fn clear_error(&self) {
        self.lock().state.error = None;
    }

    fn settle(&self, token: u64, result: Result<Settled, SdkError>) -> SendOutcome {
        let mut inner = self.lock();
        let Some(in_flight) = inner.finish(token) else {
            return Self::discard(token);
        };
        inner.state.is_loading = false;

        match result {
            Ok(Settled::Interrupt(prompt)) => {
                inner.state.interrupt = Some(prompt);
                SendOutcome::Interrupted
            }
            Ok(Settled::Answer {
                content,
                clears_interrupt,
            }) => {
                inner.state.messages.push(Message::assistant(content));
                if clears_interrupt {
                    inner.state.interrupt = None;
                }
                SendOutcome::Replied
            }
            Err(err) => {
                let message = err.to_string();
                debug!(token, error = %message, "request failed");
                if let Some(prompt) = in_flight.restore_interrupt {
                    inner.state.interrupt = Some(prompt);
                }
                inner.state.error = Some(message.clone());
                SendOutcome::Failed(message)
            }
        }
    }

    /// The slot was already released by a newer `begin` or a clear.
    fn discard(token: u64) -> SendOutcome {
        debug!(token, "discarding superseded request");
        SendOutcome::Superseded
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
