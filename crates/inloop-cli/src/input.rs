//! Parsing of one line typed at the prompt.

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// Leave the client.
    Quit,
    /// Drop the conversation and start a new thread.
    NewChat,
    /// Show the available commands.
    Help,
    /// Text to send (message or interrupt answer).
    Text(&'a str),
    /// Blank line.
    Empty,
}

impl<'a> Input<'a> {
    pub fn parse(line: &'a str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "/quit" | "/exit" => Self::Quit,
            "/new" => Self::NewChat,
            "/help" => Self::Help,
            text => Self::Text(text),
        }
    }
}

pub const HELP: &str = "\
commands:
  /new    start a new chat (new thread)
  /help   show this help
  /quit   exit
while the assistant asks a question, type your answer or the number of an option";
