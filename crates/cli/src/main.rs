use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use waypoint_agents::{MessageSink, TravelDesk};
use waypoint_core::{ChatMessage, MessageOutcome};
use waypoint_llm::{ModelConfig, OpenAiChatModel};
use waypoint_observability::{init_tracing_with, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "waypoint")]
#[command(about = "Waypoint travel desk CLI")]
struct Cli {
    #[command(flatten)]
    model: ModelArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ModelArgs {
    /// Chat-completions base URL.
    #[arg(long, global = true, env = "WAYPOINT_MODEL_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, global = true, env = "WAYPOINT_MODEL")]
    model: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive transcript; one line per message.
    Chat,
    /// Start a session and send a single message.
    Ask {
        question: String,
        #[arg(long)]
        json: bool,
    },
}

/// Prints each message as soon as the handler sends it.
struct TerminalSink;

impl MessageSink for TerminalSink {
    fn send(&mut self, message: ChatMessage) {
        println!("{}", message.content);
        if message.kind.is_terminal() {
            println!();
        }
    }
}

#[derive(Debug, Serialize)]
struct AskOutput {
    outcome: MessageOutcome,
    messages: Vec<ChatMessage>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing_with("warn");
    let cli = Cli::parse();

    let config = ModelConfig::from_env().with_overrides(cli.model.base_url, cli.model.model);
    let model = Arc::new(OpenAiChatModel::new(config)?);
    let desk = TravelDesk::new(model, AppMetrics::shared());

    match cli.command {
        Command::Chat => run_chat(desk).await?,
        Command::Ask { question, json } => {
            if json {
                let mut messages: Vec<ChatMessage> = Vec::new();
                desk.on_session_start(&mut messages);
                messages.push(ChatMessage::user(question.as_str()));
                let outcome = desk.on_message(&question, &mut messages).await?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&AskOutput { outcome, messages })?
                );
            } else {
                let mut sink = TerminalSink;
                desk.on_session_start(&mut sink);
                desk.on_message(&question, &mut sink).await?;
            }
        }
    }

    Ok(())
}

async fn run_chat(desk: TravelDesk<OpenAiChatModel>) -> Result<()> {
    let mut sink = TerminalSink;
    desk.on_session_start(&mut sink);
    println!("type 'exit' to quit.\n");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        let read = io::stdin()
            .read_line(&mut line)
            .context("failed reading from stdin")?;
        if read == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        println!();
        if let Err(err) = desk.on_message(message, &mut sink).await {
            eprintln!("error: {err:#}\n");
        }
    }

    Ok(())
}
