/// API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::AppState;
use crate::core::{ContainerAction, SystemMetrics};

/// Error reply with a `{"error": ...}` body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub container_id: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: &'static str,
}

pub async fn get_metrics(State(state): State<AppState>) -> Result<Json<SystemMetrics>, ApiError> {
    let mut collector = state.collector.lock().await;
    let metrics = collector.collect().await.map_err(|e| {
        warn!("Metrics collection failed: {:#}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(metrics))
}

pub async fn container_action(
    State(state): State<AppState>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let action: ContainerAction = request
        .action
        .parse()
        .map_err(|e: crate::core::ActionError| ApiError::new(StatusCode::BAD_REQUEST, e.to_string()))?;

    let docker = state
        .docker
        .as_ref()
        .ok_or_else(|| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Docker is not available"))?;

    docker.perform(action, &request.container_id).await.map_err(|e| {
        warn!("Container {} failed for {}: {:#}", action, request.container_id, e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e))
    })?;

    Ok(Json(StatusResponse { status: "success" }))
}

pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse { status: "healthy" })
}
