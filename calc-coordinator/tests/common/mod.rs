use calc_coordinator::{consumers, http, liveness, Coordinator};
use calc_protocol::{Broker, InMemoryBroker};
use calc_store::InMemoryStore;
use calc_types::OperatorTimeouts;
use std::sync::Arc;
use std::time::Duration;

/// Boots a full coordinator (store, broker, consumers, sweeps, HTTP
/// server) on an ephemeral port and returns its base URL.
pub async fn spawn_coordinator(heartbeat: Duration, task_check: Duration) -> (String, Arc<Coordinator>, Arc<dyn Broker>) {
    let store = Arc::new(InMemoryStore::new());
    let broker = InMemoryBroker::new();
    let coordinator = Coordinator::new(store, broker.clone(), OperatorTimeouts::default());

    tokio::spawn(consumers::claims_consumer_loop(coordinator.clone()));
    tokio::spawn(consumers::results_consumer_loop(coordinator.clone()));
    tokio::spawn(liveness::heartbeat_sweep_loop(coordinator.clone(), heartbeat));
    tokio::spawn(liveness::task_check_sweep_loop(coordinator.clone(), task_check));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = http::router(coordinator.clone());
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), coordinator, broker)
}

/// Spawns a worker registered against `base_url`, driven by its
/// heartbeat and task loops for the lifetime of the test process.
pub async fn spawn_worker(base_url: &str, broker: Arc<dyn Broker>) {
    let worker = calc_worker::WorkerRuntime::register(base_url.to_string(), broker)
        .await
        .expect("worker registration");
    tokio::spawn(async move {
        tokio::join!(
            worker.heartbeat_loop(Duration::from_millis(50)),
            worker.task_loop(),
        );
    });
}

/// Polls `GET /expressions/{id}` until the task reaches a terminal status
/// or `timeout` elapses.
pub async fn wait_for_terminal(base_url: &str, id: calc_types::TaskId, timeout: Duration) -> calc_types::Task {
    let client = reqwest::Client::new();
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let resp = client
            .get(format!("{base_url}/expressions/{id}"))
            .send()
            .await
            .unwrap();
        let tasks: Vec<calc_types::Task> = resp.json().await.unwrap();
        let task = tasks.into_iter().next().expect("task exists");
        if task.status.is_terminal() {
            return task;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("task {id} did not reach a terminal status within {timeout:?}, last status: {:?}", task.status);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
