#![deny(missing_docs)]

//! # In-the-Loop Models
//!
//! Core data types shared by the chat client and the API server.
//!
//! ## Conversation model
//!
//! ```text
//! ChatState
//! ├── messages: Vec<Message>        (append-only log)
//! ├── is_loading: bool
//! ├── error: Option<String>         (dismissable banner)
//! └── interrupt: Option<InterruptPrompt>
//!     └── options: InterruptOptions (list | label → description)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`message`] | `Message`, `MessageId`, `Role` |
//! | [`interrupt`] | Transient clarification prompts |
//! | [`thread`] | Client-generated `ThreadId` |
//! | [`state`] | The `ChatState` aggregate and its `ChatPhase` projection |
//! | [`api`] | Request/response bodies of `/api/graph` and `/api/chat` |

pub mod api;
pub mod error;
pub mod interrupt;
pub mod message;
pub mod state;
pub mod thread;

// Re-export all public types at crate root for convenience.
pub use api::*;
pub use error::*;
pub use interrupt::*;
pub use message::*;
pub use state::*;
pub use thread::*;
