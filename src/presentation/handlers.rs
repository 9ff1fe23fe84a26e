// HTTP request handlers
use crate::application::query_service::SimulationStatus;
use crate::domain::reading::{Reading, ReadingId};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RealtimeQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct RealtimeResponse {
    #[serde(rename = "RealTimeLawnMowerData")]
    pub data: Vec<Reading>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub history: Vec<Reading>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct GeneratedResponse {
    pub message: String,
    pub data: Reading,
}

#[derive(Serialize)]
pub struct DeleteAllResponse {
    pub message: String,
    pub deleted: usize,
}

#[derive(Serialize)]
pub struct DeleteOneResponse {
    pub message: String,
    pub deleted: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub running: bool,
    pub battery_level: f64,
    pub area_covered: f64,
    pub stored_readings: usize,
}

impl From<SimulationStatus> for StatusResponse {
    fn from(status: SimulationStatus) -> Self {
        Self {
            running: status.running,
            battery_level: status.battery_level,
            area_covered: status.area_covered,
            stored_readings: status.stored_readings,
        }
    }
}

/// Root endpoint for verification
pub async fn root() -> &'static str {
    "Backend is running"
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Latest window of readings, oldest first
pub async fn realtime_data(
    query: Result<Query<RealtimeQuery>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RealtimeResponse>, ApiError> {
    let Query(query) = query?;
    let data = state.query_service.realtime(query.limit).await?;
    Ok(Json(RealtimeResponse { data }))
}

/// Full history, newest first
pub async fn history_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.query_service.history().await?;
    Ok(Json(HistoryResponse { history }))
}

pub async fn simulation_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.query_service.status(&state.scheduler).await?;
    Ok(Json(status.into()))
}

pub async fn generate_fake_data(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GeneratedResponse>, ApiError> {
    let data = state.scheduler.generate_once().await?;
    Ok(Json(GeneratedResponse {
        message: "Fake data generated successfully.".to_string(),
        data,
    }))
}

pub async fn start_generating(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.scheduler.start().await?;
    Ok(Json(MessageResponse {
        message: "Data generation started.".to_string(),
    }))
}

pub async fn stop_generating(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.scheduler.stop().await?;
    Ok(Json(MessageResponse {
        message: "Data generation stopped.".to_string(),
    }))
}

pub async fn delete_all_history(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteAllResponse>, ApiError> {
    let deleted = state.query_service.delete_all().await?;
    Ok(Json(DeleteAllResponse {
        message: "All history deleted.".to_string(),
        deleted,
    }))
}

/// Deleting an unknown id still succeeds
pub async fn delete_history(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DeleteOneResponse>, ApiError> {
    let deleted = state.query_service.delete_one(&ReadingId::from(id)).await?;
    Ok(Json(DeleteOneResponse {
        message: "History entry deleted.".to_string(),
        deleted,
    }))
}
