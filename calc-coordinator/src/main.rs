//! Coordinator binary entry point (`spec.md` §4.5, §4.6, `SPEC_FULL.md` §A4).

use calc_coordinator::{consumers, http, liveness, Coordinator, CoordinatorConfig};
use calc_protocol::InMemoryBroker;
use calc_store::InMemoryStore;
use calc_worker::WorkerRuntime;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "calc-coordinator", about = "Distributed arithmetic evaluation coordinator")]
struct Args {
    /// Path to a TOML config file; falls back to defaults + env overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `bind` from the loaded config.
    #[arg(long, env = "CALC_COORDINATOR_BIND")]
    bind: Option<String>,

    /// Spawn this many `WorkerRuntime`s in-process, sharing this
    /// coordinator's broker, for a self-contained single-process demo.
    /// The real deployment target is separate `calc-worker` processes
    /// talking to a networked broker (`spec.md` §1); this flag exists
    /// because the in-memory broker bundled here cannot be reached from
    /// another OS process.
    #[arg(long, default_value_t = 0)]
    embedded_workers: usize,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config: CoordinatorConfig = match calc_config::load(args.config.as_deref(), "CALC_COORDINATOR") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("fatal boot failure: config error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .init();

    let store = Arc::new(InMemoryStore::new());
    let broker = InMemoryBroker::new();
    let coordinator = Coordinator::new(store, broker.clone(), config.initial_timeouts);

    tokio::spawn(consumers::claims_consumer_loop(coordinator.clone()));
    tokio::spawn(consumers::results_consumer_loop(coordinator.clone()));
    tokio::spawn(liveness::heartbeat_sweep_loop(
        coordinator.clone(),
        Duration::from_secs(config.heartbeat_sweep_secs),
    ));
    tokio::spawn(liveness::task_check_sweep_loop(
        coordinator.clone(),
        Duration::from_secs(config.task_check_sweep_secs),
    ));

    let bind_url = format!("http://{}", config.bind);
    for n in 0..args.embedded_workers {
        let broker = broker.clone();
        let bind_url = bind_url.clone();
        tokio::spawn(async move {
            // The HTTP listener below binds concurrently with this task
            // starting, so retry registration briefly instead of racing it.
            let mut attempts = 0;
            let worker = loop {
                match WorkerRuntime::register(bind_url.clone(), broker.clone()).await {
                    Ok(worker) => break worker,
                    Err(e) if attempts < 20 => {
                        attempts += 1;
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        let _ = e;
                    }
                    Err(e) => {
                        error!(worker = n, error = %e, "embedded worker failed to register");
                        return;
                    }
                }
            };
            info!(worker = n, "embedded worker registered");
            tokio::join!(
                worker.heartbeat_loop(Duration::from_secs(15)),
                worker.task_loop(),
            );
        });
    }

    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("fatal boot failure: could not bind {}: {e}", config.bind);
            return ExitCode::FAILURE;
        }
    };
    info!(bind = %config.bind, "coordinator listening");

    let router = http::router(coordinator);
    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "HTTP server exited with error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
