// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! bbos: human-facing CLI to launch the kernel/supervisor/heartbeat triad
//! or talk to an already-running supervisor (SPEC_FULL.md §0 `[AMBIENT]`).

mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::SupervisorClient;
use output::OutputFormat;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bbos", about = "Autonomous agent runtime control CLI")]
struct Cli {
    /// Supervisor base URL.
    #[arg(long, global = true, default_value = "http://127.0.0.1:8000")]
    supervisor: String,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Spawn the kernel/supervisor/heartbeat triad and wait.
    Start,
    /// Show supervisor status.
    Status,
    /// Send one chat turn.
    Chat {
        message: String,
        #[arg(long)]
        provider: Option<String>,
    },
    /// Show the conversation history.
    History,
    /// Show the tool-call log.
    Log,
    /// Show the learnings document.
    Learnings,
    /// Trigger a digest pass.
    Digest {
        #[arg(long)]
        replay_ratio: Option<f64>,
    },
    /// Checkpoint the running kernel.
    Checkpoint,
    /// Restore the kernel from its last checkpoint.
    Restore,
    /// Show CRIU/checkpoint status.
    CriuStatus,
    /// Trigger the evolve rebuild script.
    Evolve,
    /// Show evolve run status.
    EvolveStatus,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    if matches!(cli.command, Command::Start) {
        return commands::start::handle().await;
    }

    let client = SupervisorClient::new(cli.supervisor);
    match cli.command {
        Command::Start => unreachable!(),
        Command::Status => commands::status::handle(&client, cli.format).await,
        Command::Chat { message, provider } => commands::chat::handle(&client, &message, provider.as_deref(), cli.format).await,
        Command::History => commands::chat::history(&client, cli.format).await,
        Command::Log => commands::chat::log(&client, cli.format).await,
        Command::Learnings => commands::memory::learnings(&client, cli.format).await,
        Command::Digest { replay_ratio } => commands::memory::digest(&client, replay_ratio, cli.format).await,
        Command::Checkpoint => commands::criu::checkpoint(&client, cli.format).await,
        Command::Restore => commands::criu::restore(&client, cli.format).await,
        Command::CriuStatus => commands::criu::status(&client, cli.format).await,
        Command::Evolve => commands::evolve::trigger(&client, cli.format).await,
        Command::EvolveStatus => commands::evolve::status(&client, cli.format).await,
    }
}
