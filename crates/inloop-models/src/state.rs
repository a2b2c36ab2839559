//! The conversation aggregate rendered by every client.

use serde::{Deserialize, Serialize};

use crate::interrupt::InterruptPrompt;
use crate::message::Message;

/// Which of the three client states a conversation is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ChatPhase {
    /// Nothing in flight; the user may type.
    Idle,
    /// A request is in flight.
    AwaitingReply,
    /// The backend paused and waits for an answer to an interrupt.
    AwaitingClarification,
}

/// Complete client-side conversation state.
///
/// Owned by a single controller; front-ends only read snapshots of it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ChatState {
    /// Append-only conversation log.
    pub messages: Vec<Message>,
    /// `true` while a request is in flight.
    pub is_loading: bool,
    /// Last error, shown as a dismissable banner.
    pub error: Option<String>,
    /// Pending clarification prompt, never part of `messages`.
    pub interrupt: Option<InterruptPrompt>,
}

impl ChatState {
    /// Project the state onto the three client phases.
    ///
    /// Loading wins over a pending interrupt because an answer may already
    /// be on its way.
    pub fn phase(&self) -> ChatPhase {
        if self.is_loading {
            ChatPhase::AwaitingReply
        } else if self.interrupt.is_some() {
            ChatPhase::AwaitingClarification
        } else {
            ChatPhase::Idle
        }
    }
}
