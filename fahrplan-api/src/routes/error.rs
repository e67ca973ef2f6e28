use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fahrplan_core::TimeError;
use serde::Serialize;
use std::fmt;

use crate::{pdf::PdfError, repositories::RepositoryError};

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

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

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
        }
    }
}

impl From<TimeError> for ApiError {
    fn from(err: TimeError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<PdfError> for ApiError {
    fn from(err: PdfError) -> Self {
        tracing::error!("PDF rendering failed: {:?}", err);
        Self::internal("PDF rendering failed")
    }
}
