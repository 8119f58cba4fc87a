//! Thin HTTP admission surface (A3): `spec.md` §6 routes, argument
//! marshalling and status-code mapping only — no business logic beyond
//! that lives here (`SPEC_FULL.md` §4.5).

use crate::dispatch::Coordinator;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use calc_types::{CalcError, OperatorTimeouts, Task, TaskId, Worker, WorkerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn router(coordinator: Arc<Coordinator>) -> Router {
    Router::new()
        .route("/agents", post(register_worker).get(list_workers))
        .route("/agents/:id/ping", post(ping_worker))
        .route("/expressions", post(submit_expression).get(list_tasks))
        .route("/expressions/:id", get(get_task))
        .route("/timeouts", post(set_timeouts).get(get_timeouts))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(coordinator)
}

struct ApiError(CalcError);

impl From<CalcError> for ApiError {
    fn from(e: CalcError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CalcError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CalcError::TransientIO(_) | CalcError::FatalBoot(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CalcError::InvalidExpression(_) | CalcError::EvaluationFailure(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.0.to_string()).into_response()
    }
}

#[derive(Serialize)]
struct IdResponse<T: Serialize> {
    id: T,
}

async fn register_worker(State(coordinator): State<Arc<Coordinator>>) -> Result<Json<IdResponse<WorkerId>>, ApiError> {
    let id = coordinator.register_worker().await?;
    Ok(Json(IdResponse { id }))
}

async fn list_workers(State(coordinator): State<Arc<Coordinator>>) -> Result<Json<Vec<Worker>>, ApiError> {
    Ok(Json(coordinator.list_workers().await?))
}

async fn ping_worker(
    State(coordinator): State<Arc<Coordinator>>,
    Path(id): Path<WorkerId>,
) -> Result<StatusCode, ApiError> {
    coordinator.ping_worker(id).await?;
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct SubmitExpressionRequest {
    expression: String,
}

async fn submit_expression(
    State(coordinator): State<Arc<Coordinator>>,
    Json(body): Json<SubmitExpressionRequest>,
) -> Result<Json<IdResponse<TaskId>>, ApiError> {
    if body.expression.trim().is_empty() {
        return Err(CalcError::BadRequest("expression must not be empty".into()).into());
    }
    let id = coordinator.submit_expression(body.expression).await?;
    Ok(Json(IdResponse { id }))
}

async fn list_tasks(State(coordinator): State<Arc<Coordinator>>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(coordinator.list_tasks().await?))
}

async fn get_task(
    State(coordinator): State<Arc<Coordinator>>,
    Path(id): Path<TaskId>,
) -> Result<Json<Vec<Task>>, ApiError> {
    match coordinator.get_task(id).await? {
        Some(task) => Ok(Json(vec![task])),
        None => Err(CalcError::BadRequest(format!("no such task: {id}")).into()),
    }
}

async fn set_timeouts(
    State(coordinator): State<Arc<Coordinator>>,
    Json(body): Json<OperatorTimeouts>,
) -> StatusCode {
    coordinator.set_timeouts(body).await;
    StatusCode::OK
}

async fn get_timeouts(State(coordinator): State<Arc<Coordinator>>) -> Json<std::collections::HashMap<String, String>> {
    Json(coordinator.get_timeouts().await.as_display_map())
}
