// HTTP error mapping - typed failures to status codes without leaking storage details
use crate::application::query_service::QueryError;
use crate::application::scheduler::SchedulerError;
use crate::application::simulation_engine::TickError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

const PERSISTENCE_FAILURE_MESSAGE: &str = "Failed to access telemetry storage";

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn persistence(detail: &dyn std::fmt::Display) -> Self {
        tracing::error!("Persistence failure: {}", detail);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, PERSISTENCE_FAILURE_MESSAGE)
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            QueryError::Persistence(e) => Self::persistence(&e),
        }
    }
}

impl From<TickError> for ApiError {
    fn from(err: TickError) -> Self {
        match err {
            TickError::Persistence(e) => Self::persistence(&e),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}
