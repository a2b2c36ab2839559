//! Plain-text projection of the conversation state.
//!
//! [`Renderer`] remembers what it already printed so each call only writes
//! what changed: new assistant messages, a new interrupt prompt, an error.

use std::io::{self, Write};

use inloop_models::{ChatPhase, ChatState, InterruptPrompt, MessageId, Role};

#[derive(Debug, Default)]
pub struct Renderer {
    shown_messages: usize,
    /// Id of the last message printed, to notice a replaced log.
    last_shown: Option<MessageId>,
    shown_interrupt: Option<InterruptPrompt>,
}

impl Renderer {
    pub fn render(&mut self, state: &ChatState, out: &mut impl Write) -> io::Result<()> {
        let same_log = self.shown_messages == 0
            || state
                .messages
                .get(self.shown_messages - 1)
                .is_some_and(|m| Some(m.id) == self.last_shown);
        if !same_log {
            *self = Self::default();
        }

        for message in &state.messages[self.shown_messages..] {
            // The user's own lines are already on screen.
            if message.role == Role::Assistant {
                writeln!(out, "assistant> {}", message.content)?;
            }
        }
        self.shown_messages = state.messages.len();
        self.last_shown = state.messages.last().map(|m| m.id);

        if state.interrupt != self.shown_interrupt {
            if let Some(prompt) = &state.interrupt {
                write_prompt(prompt, out)?;
            }
            self.shown_interrupt.clone_from(&state.interrupt);
        }

        if let Some(error) = &state.error {
            writeln!(out, "error: {error}")?;
        }
        Ok(())
    }

    pub fn prompt(state: &ChatState) -> &'static str {
        match state.phase() {
            ChatPhase::AwaitingClarification => "answer> ",
            ChatPhase::Idle | ChatPhase::AwaitingReply => "you> ",
        }
    }
}

fn write_prompt(prompt: &InterruptPrompt, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "assistant?> {}", prompt.question)?;
    let Some(options) = prompt.options.as_ref().filter(|o| !o.is_empty()) else {
        return Ok(());
    };
    for (i, (label, description)) in options.choices().into_iter().enumerate() {
        match description {
            Some(description) => writeln!(out, "  {}. {label}: {description}", i + 1)?,
            None => writeln!(out, "  {}. {label}", i + 1)?,
        }
    }
    Ok(())
}
