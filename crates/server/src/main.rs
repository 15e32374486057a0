// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dcpd` — the server host: hosts the Job Manager (C5) and the TCP
//! listener worker hosts and hubs authenticate against (§6).

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dcp_classcache::{CacheStore, ClassManager, FileCacheStore, InMemoryCacheStore};
use dcp_core::{CoreError, CoreResult, ServerConfig};
use dcp_scheduler::TaskScheduler;
use dcp_server::{EventBus, JobManager, JobProgram, ServerContext};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "dcpd", about = "Distributed compute platform server (C5 Job Manager)")]
struct Cli {
    /// Path to a TOML config file (§9: falls back to defaults when absent).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides the configured port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory the class cache is persisted under. Unset keeps the
    /// cache in memory only (lost across restarts, per §1 Non-goals: no
    /// persistent job recovery).
    #[arg(long)]
    state_dir: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> CoreResult<ServerConfig> {
    let Some(path) = path else {
        return Ok(ServerConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|err| CoreError::IllegalArgument(format!("reading {}: {err}", path.display())))?;
    toml::from_str(&text).map_err(|err| CoreError::IllegalArgument(format!("parsing {}: {err}", path.display())))
}

/// The real platform this spec is distilled from dynamically loads a job's
/// executable logic from the uploaded class bytes; that mechanism is out of
/// scope here (§1 Non-goals: no job-computation semantics), so every job
/// submission is rejected at resolution time instead of silently no-opping.
fn unresolvable_job_program(_payload: &[u8]) -> CoreResult<Arc<dyn JobProgram>> {
    Err(CoreError::ClassNotFound("job-computation semantics are out of scope for this host".into()))
}

async fn run(classes_store: impl CacheStore + Send + Sync + 'static, cli: Cli) -> CoreResult<()> {
    let mut config = load_config(cli.config.as_ref())?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let classes = Arc::new(ClassManager::new(classes_store));
    let scheduler = Arc::new(TaskScheduler::new());
    let events = Arc::new(EventBus::new());
    let job_manager = Arc::new(JobManager::new(
        classes,
        scheduler,
        events,
        unresolvable_job_program,
        config.clone(),
    ));
    let ctx = Arc::new(ServerContext { job_manager });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|err| CoreError::IllegalArgument(format!("binding {addr}: {err}")))?;
    info!(%addr, "dcpd listening");

    dcp_server::run_server(listener, ctx).await;
    Ok(())
}

#[tokio::main]
async fn main() -> CoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.state_dir.clone() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .map_err(|err| CoreError::IllegalArgument(format!("creating {}: {err}", dir.display())))?;
            let store = FileCacheStore::new(dir.join("class_cache.zst"));
            run(store, cli).await
        }
        None => run(InMemoryCacheStore, cli).await,
    }
}
