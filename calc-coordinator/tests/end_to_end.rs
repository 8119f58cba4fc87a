//! End-to-end scenario table from `spec.md` §8, driven over the real
//! HTTP admission surface, broker and store.

mod common;

use std::time::Duration;

#[tokio::test]
async fn scenario_table() {
    let (base_url, _coordinator, broker) =
        common::spawn_coordinator(Duration::from_secs(30), Duration::from_millis(50)).await;
    common::spawn_worker(&base_url, broker).await;

    let cases = [
        ("1 + 2", "COMPLETED", "3"),
        ("1 - 3 * 2", "COMPLETED", "-5"),
        ("-4 + 10 / 3", "COMPLETED", "-1"),
        ("5 + + 2", "INVALID", ""),
        ("( 1 + 2 )", "INVALID", ""),
        ("6 / 0", "INVALID", ""),
    ];

    let client = reqwest::Client::new();
    for (expression, expected_status, expected_result) in cases {
        let resp = client
            .post(format!("{base_url}/expressions"))
            .json(&serde_json::json!({ "expression": expression }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let body: serde_json::Value = resp.json().await.unwrap();
        let id: calc_types::TaskId =
            serde_json::from_value(body["id"].clone()).unwrap();

        let task = common::wait_for_terminal(&base_url, id, Duration::from_secs(5)).await;
        let status = serde_json::to_value(task.status).unwrap();
        assert_eq!(status.as_str().unwrap(), expected_status, "expression {expression:?}");
        assert_eq!(task.result, expected_result, "expression {expression:?}");
    }
}

#[tokio::test]
async fn list_endpoints_reflect_submitted_work() {
    let (base_url, _coordinator, broker) =
        common::spawn_coordinator(Duration::from_secs(30), Duration::from_millis(50)).await;
    common::spawn_worker(&base_url, broker).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/expressions"))
        .json(&serde_json::json!({ "expression": "1 + 1" }))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = resp.json().await.unwrap();
    let id: calc_types::TaskId = serde_json::from_value(body["id"].clone()).unwrap();
    common::wait_for_terminal(&base_url, id, Duration::from_secs(5)).await;

    let tasks: Vec<calc_types::Task> = client
        .get(format!("{base_url}/expressions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(tasks.iter().any(|t| t.id == id));

    let workers: Vec<calc_types::Worker> = client
        .get(format!("{base_url}/agents"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(workers.len(), 1);
}

#[tokio::test]
async fn rejects_empty_expression_with_bad_request() {
    let (base_url, _coordinator, broker) =
        common::spawn_coordinator(Duration::from_secs(30), Duration::from_millis(50)).await;
    common::spawn_worker(&base_url, broker).await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/expressions"))
        .json(&serde_json::json!({ "expression": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}
