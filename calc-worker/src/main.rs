//! Worker binary entry point (`spec.md` §4.4, `SPEC_FULL.md` §A4).
//!
//! Registers with the coordinator's HTTP admission surface, then runs the
//! heartbeat loop and the task-consumer loop concurrently until killed.
//!
//! The broker this binary talks to is the process-local `InMemoryBroker`,
//! since the real broker is an external collaborator out of this
//! workspace's scope (`spec.md` §1). A deployment with a real shared
//! broker substitutes a networked `Broker` implementation here instead;
//! see `calc-coordinator`'s `--embedded-workers` flag for a single-process
//! demo that actually exercises task dispatch end to end.

use calc_protocol::InMemoryBroker;
use calc_worker::{WorkerConfig, WorkerRuntime};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

#[derive(Parser, Debug)]
#[command(name = "calc-worker", about = "Distributed arithmetic evaluation worker")]
struct Args {
    /// Path to a TOML config file; falls back to defaults + env overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `coordinator_url` from the loaded config.
    #[arg(long, env = "CALC_WORKER_COORDINATOR_URL")]
    coordinator_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config: WorkerConfig = calc_config::load(args.config.as_deref(), "CALC_WORKER")
        .map_err(|e| format!("config error: {e}"))?;
    if let Some(url) = args.coordinator_url {
        config.coordinator_url = url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    let broker = InMemoryBroker::new();
    let worker = WorkerRuntime::register(config.coordinator_url.clone(), broker)
        .await
        .map_err(|e| format!("fatal boot failure: {e}"))?;

    let heartbeat = worker.heartbeat_loop(Duration::from_secs(config.ping_interval_secs));
    let tasks = worker.task_loop();

    tokio::select! {
        _ = heartbeat => error!("heartbeat loop exited unexpectedly"),
        _ = tasks => error!("task loop exited unexpectedly"),
    }

    Ok(())
}
