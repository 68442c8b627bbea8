use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::pkg::internal::{lifecycle::ListingStatus, questions::AnswerErrors, validation};

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot move listing from {from} to {to}")]
    InvalidTransition { from: ListingStatus, to: ListingStatus },

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        AppError::Forbidden(reason.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthenticated => "ERR-AUTH-001",
            AppError::Forbidden(_) => "ERR-AUTH-002",
            AppError::Validation(_) => "ERR-REQ-001",
            AppError::NotFound(_) => "ERR-REQ-002",
            AppError::Conflict(_) => "ERR-REQ-003",
            AppError::InvalidTransition { .. } => "ERR-LIFECYCLE-001",
            AppError::Database(_) => "ERR-DB-000",
            AppError::Migration(_) => "ERR-DB-001",
            AppError::Config(_) => "ERR-CONF-001",
            AppError::Io(_) => "ERR-IO-001",
            AppError::Serialization(_) => "ERR-SER-001",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(
            validation::collect(&errors)
                .into_iter()
                .map(|e| e.message)
                .collect(),
        )
    }
}

impl From<AnswerErrors> for AppError {
    fn from(errors: AnswerErrors) -> Self {
        AppError::Validation(errors.messages())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

/// Error bodies follow the `{statusCode, message, error}` shape the web
/// frontend already parses; `message` is an array for validation failures.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Validation(messages) => json!(messages),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("{}: {}", self.code(), &self);
                json!("internal server error")
            }
            _ => json!(self.to_string()),
        };
        let body = json!({
            "statusCode": status.as_u16(),
            "message": message,
            "error": self.code(),
        });
        (status, Json(body)).into_response()
    }
}
