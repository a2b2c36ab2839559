//! Clarification prompts raised by the graph backend.
//!
//! An [`InterruptPrompt`] is transient: it lives in
//! [`ChatState::interrupt`](crate::ChatState::interrupt) while the backend run
//! is paused and is never written to the message log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Question shown when the backend pauses without saying why.
pub const DEFAULT_INTERRUPT_QUESTION: &str = "I have a clarification question.";

/// Suggested answers attached to an interrupt.
///
/// Older backends send a plain list of strings; newer ones send a map of
/// label → description. Both shapes are accepted on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum InterruptOptions {
    /// Bare answer labels.
    List(Vec<String>),
    /// Answer labels with a human-readable description each.
    Described(BTreeMap<String, String>),
}

impl InterruptOptions {
    /// Number of suggested answers.
    pub fn len(&self) -> usize {
        match self {
            Self::List(items) => items.len(),
            Self::Described(items) => items.len(),
        }
    }

    /// `true` when no answer is suggested.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Labels in display order, each with its description if any.
    pub fn choices(&self) -> Vec<(&str, Option<&str>)> {
        match self {
            Self::List(items) => items.iter().map(|label| (label.as_str(), None)).collect(),
            Self::Described(items) => items
                .iter()
                .map(|(label, description)| (label.as_str(), Some(description.as_str())))
                .collect(),
        }
    }

    /// Map a 1-based choice number to its label.
    ///
    /// Returns `None` when `input` is not a number or is out of range, in
    /// which case the caller should send the text as typed.
    pub fn pick(&self, input: &str) -> Option<&str> {
        let index: usize = input.trim().parse().ok()?;
        let choices = self.choices();
        index
            .checked_sub(1)
            .and_then(|i| choices.get(i))
            .map(|(label, _)| *label)
    }
}

/// A pending clarification request from the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct InterruptPrompt {
    /// The question the backend wants answered.
    pub question: String,
    /// Optional suggested answers.
    #[serde(default)]
    pub options: Option<InterruptOptions>,
}

impl InterruptPrompt {
    /// Build a prompt, falling back to [`DEFAULT_INTERRUPT_QUESTION`] when
    /// the backend supplied no question.
    pub fn new(question: Option<String>, options: Option<InterruptOptions>) -> Self {
        Self {
            question: question.unwrap_or_else(|| DEFAULT_INTERRUPT_QUESTION.to_string()),
            options,
        }
    }
}
