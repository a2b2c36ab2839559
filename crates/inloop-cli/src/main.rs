//! `inloop`: terminal client for the In-the-Loop chat API.

mod input;
mod render;

use std::io::Write;

use anyhow::{bail, Context};
use clap::Parser;
use inloop_models::TaskType;
use inloop_sdk::{ApiClient, ChatController, SendOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::input::{Input, HELP};
use crate::render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "inloop")]
#[command(author, version, about = "Chat with the In-the-Loop agent from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the API server.
    #[arg(long, env = "INLOOP_SERVER_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Task hint sent when a new run starts (none, essay, code).
    #[arg(long, default_value_t = TaskType::None)]
    task: TaskType,

    /// Talk to the LLM directly instead of the graph backend.
    #[arg(long)]
    direct: bool,

    /// Provider API key, required with --direct.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the conversation.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let api_key = match (cli.direct, cli.api_key.as_deref()) {
        (true, None | Some("")) => bail!("--direct needs an API key (--api-key or OPENAI_API_KEY)"),
        (_, key) => key.unwrap_or_default().to_string(),
    };

    let client = ApiClient::new(&cli.server).context("invalid --server")?;
    let controller = ChatController::new(client);
    let mut renderer = Renderer::default();
    let mut stdout = std::io::stdout();

    writeln!(stdout, "connected to {} (thread {}), /help for commands", cli.server, controller.thread_id())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        write!(stdout, "{}", Renderer::prompt(&controller.state()))?;
        stdout.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let text = match Input::parse(&line) {
            Input::Quit => break,
            Input::Empty => continue,
            Input::Help => {
                writeln!(stdout, "{HELP}")?;
                continue;
            }
            Input::NewChat => {
                controller.clear_messages();
                renderer = Renderer::default();
                writeln!(stdout, "new chat (thread {})", controller.thread_id())?;
                continue;
            }
            Input::Text(text) => text,
        };

        let pending = controller.state().interrupt;
        let outcome = if let Some(prompt) = pending {
            let answer = prompt
                .options
                .as_ref()
                .and_then(|options| options.pick(text))
                .unwrap_or(text);
            controller.send_interrupt_answer(answer).await
        } else if cli.direct {
            controller.send_direct(text, &api_key).await
        } else {
            controller.send_message(text, cli.task).await
        };
        debug!(?outcome, "send finished");

        renderer.render(&controller.state(), &mut stdout)?;
        if matches!(outcome, SendOutcome::Failed(_)) {
            controller.clear_error();
        }
    }

    Ok(())
}
