//! Error types for the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use helpdesk::HelpdeskError;
use thiserror::Error;

/// Errors returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Engine error.
    #[error(transparent)]
    Helpdesk(#[from] HelpdeskError),

    /// Database error outside the engine (statistics).
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Helpdesk(err) => match err {
                HelpdeskError::NotFound { .. } | HelpdeskError::NoTechnicianAvailable => {
                    StatusCode::NOT_FOUND
                }
                HelpdeskError::AlreadyAssigned { .. }
                | HelpdeskError::AlreadyRegistered { .. }
                | HelpdeskError::InvalidTransition { .. } => StatusCode::CONFLICT,
                HelpdeskError::NotApproved { .. } | HelpdeskError::NotAssignee { .. } => {
                    StatusCode::FORBIDDEN
                }
                HelpdeskError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                HelpdeskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for route handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
