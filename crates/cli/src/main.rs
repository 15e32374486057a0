// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `dcp` — the CLI client for the distributed compute platform (§6 CLI
//! surface). Talks to whichever host `connect` last pointed it at.

mod client;
mod color;
mod commands;
mod exit_error;
mod output;
mod state;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "dcp", about = "Distributed compute platform CLI", styles = color::styles())]
struct Cli {
    /// Overrides the state directory `connect`/`stat`/etc. persist to.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Text or JSON output.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start this host's own `dcpd` process.
    Start {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop the `dcpd` process `start` launched.
    Stop,
    /// Show status for tracked jobs, or one by index.
    Stat { index: Option<u32> },
    /// Drop terminal jobs from local tracking.
    Clean,
    /// Cancel a tracked job by index.
    Cancel { index: u32 },
    /// Authenticate against a host and remember the connection.
    Connect {
        #[arg(long)]
        host: String,
        #[arg(long)]
        user: String,
        #[arg(long = "pass")]
        password: String,
    },
    /// Forget the current connection.
    Disconnect {
        #[arg(long)]
        host: Option<String>,
    },
    /// Upload classes that differ from the server's copy.
    Sync {
        dir: PathBuf,
        /// Print per-class progress even for classes already in sync.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Report class drift against the server without uploading.
    Verify {
        dir: Option<PathBuf>,
    },
    /// Set the idle directive workers receive when there is no work.
    Idle { seconds: u64 },
    /// Submit a file as a new job.
    Script {
        #[arg(short, long)]
        file: PathBuf,
        #[arg(short, long)]
        lang: Option<String>,
    },
}

fn resolve_state_dir(cli: &Cli) -> Result<PathBuf, ExitError> {
    match &cli.state_dir {
        Some(dir) => Ok(dir.clone()),
        None => state::state_dir().map_err(|err| ExitError::new(1, err.to_string())),
    }
}

async fn dispatch(cli: Cli) -> Result<(), ExitError> {
    let state_dir = resolve_state_dir(&cli)?;
    match cli.command {
        Command::Start { port } => commands::start::run(&state_dir, port),
        Command::Stop => commands::stop::run(&state_dir),
        Command::Stat { index } => commands::stat::run(&state_dir, index, cli.output).await,
        Command::Clean => commands::clean::run(&state_dir).await,
        Command::Cancel { index } => commands::cancel::run(&state_dir, index).await,
        Command::Connect { host, user, password } => commands::connect::run(&state_dir, host, user, password).await,
        Command::Disconnect { host } => commands::disconnect::run(&state_dir, host),
        Command::Sync { dir, verbose } => commands::sync::run(&state_dir, &dir, verbose).await,
        Command::Verify { dir } => commands::verify::run(&state_dir, dir).await,
        Command::Idle { seconds } => commands::idle::run(&state_dir, seconds).await,
        Command::Script { file, lang } => commands::script::run(&state_dir, file, lang).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli).await {
        eprintln!("error: {err}");
        std::process::exit(err.code);
    }
}
