//! # In-the-Loop SDK
//!
//! Client-side pieces of the In-the-Loop chat system:
//!
//! * [`ApiClient`]: reqwest client for `POST /api/graph` and `POST /api/chat`.
//! * [`ChatTransport`]: the seam between the controller and the network.
//! * [`ChatController`]: owns the [`ChatState`](inloop_models::ChatState)
//!   and the thread id, and decides between starting and resuming a run.
//! * [`SdkError`]: unified error type for all SDK operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use inloop_models::TaskType;
//! use inloop_sdk::{ApiClient, ChatController, SendOutcome};
//!
//! # async fn run() -> Result<(), inloop_sdk::SdkError> {
//! let controller = ChatController::new(ApiClient::new("http://localhost:3000")?);
//!
//! match controller.send_message("Write an essay", TaskType::Essay).await {
//!     SendOutcome::Interrupted => {
//!         let question = controller.state().interrupt.map(|p| p.question);
//!         println!("backend asks: {question:?}");
//!         controller.send_interrupt_answer("history").await;
//!     }
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod controller;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use controller::{ChatController, SendOutcome};
pub use error::SdkError;
pub use transport::ChatTransport;
