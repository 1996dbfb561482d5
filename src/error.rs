use crate::templates;
use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of the public poll pages. A rejected vote is not one of these:
/// it re-renders the detail page instead.
#[derive(Error, Debug)]
pub enum PollError {
    #[error("Poll not found")]
    PollNotFound,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Poll not found")]
    PollNotFound,
    #[error("Model {0} is already registered")]
    AlreadyRegistered(&'static str),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        match self {
            PollError::PollNotFound => {
                (StatusCode::NOT_FOUND, Html(templates::not_found())).into_response()
            }
            PollError::DatabaseError(msg) => {
                error!("database error while serving poll page: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html(templates::server_error()),
                )
                    .into_response()
            }
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AdminError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AdminError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "Invalid request"),
            AdminError::PollNotFound => (StatusCode::NOT_FOUND, "Poll not found"),
            AdminError::AlreadyRegistered(_) => (StatusCode::CONFLICT, "Already registered"),
            AdminError::DatabaseError(msg) => {
                error!("database error in admin: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for PollError {
    fn from(error: sqlx::Error) -> Self {
        PollError::DatabaseError(error.to_string())
    }
}

impl From<sqlx::Error> for AdminError {
    fn from(error: sqlx::Error) -> Self {
        AdminError::DatabaseError(error.to_string())
    }
}
