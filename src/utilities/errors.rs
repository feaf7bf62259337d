use std::{collections::BTreeMap, fmt};

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde::Serialize;
use serde_json::json;

use crate::features::bookings::models::BookingStatus;

/// Per-field validation messages, keyed by the request field name.
#[derive(Serialize, Default, Clone, PartialEq, Eq, Debug)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<validator::ValidationErrors> for FieldErrors {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let field = field.to_string();
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                fields.add(&field, message);
            }
        }
        fields
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Environment variable {0} not set")]
    EnvironmentVariableNotSetError(String),
    #[error("Invalid configuration value, {0}")]
    InvalidConfigError(String),
    #[error("File read error, {0}")]
    FileReadError(String),
    #[error("Sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("jsonwebtoken error")]
    JsonWebTokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Missing access token error")]
    MissingAccessToken,
    #[error("Wrong credentials")]
    WrongCredentials,
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("Validation error, {0}")]
    ValidationError(String),
    #[error("Validation errors, {0}")]
    Validation(FieldErrors),
    #[error("You have already reviewed this listing")]
    DuplicateReview,
    #[error("Cannot move booking from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("External service error, {0}")]
    ExternalServiceError(String),
    #[error("Internal error, {0}")]
    InternalError(String),
    #[error("IO error, {0}")]
    IoError(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}

impl AppError {
    /// Machine readable discriminator sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::ValidationError(_) => "validation_error",
            Self::DuplicateReview => "duplicate_review",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Conflict(_) => "conflict",
            Self::NotFoundError(_) => "not_found",
            Self::PermissionDenied(_) => "permission_denied",
            Self::MissingAccessToken | Self::WrongCredentials | Self::JsonWebTokenError(_) => {
                "not_authenticated"
            }
            _ => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::ValidationError(_)
            | Self::DuplicateReview
            | Self::InvalidTransition { .. }
            | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::NotFoundError(_) => StatusCode::NOT_FOUND,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::MissingAccessToken | Self::WrongCredentials | Self::JsonWebTokenError(_) => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match self {
            Self::Validation(fields) => json!({
                "error": "Validation failed",
                "code": code,
                "fields": fields,
            }),
            Self::Conflict(message) => {
                let fields = FieldErrors::single("non_field_errors", message.clone());
                json!({"error": message, "code": code, "fields": fields})
            }
            Self::JsonWebTokenError(e) => json!({"error": e.to_string(), "code": code}),
            Self::MissingAccessToken => {
                json!({"error": "Authentication credentials were not provided", "code": code})
            }
            error if status.is_server_error() => {
                tracing::error!(%error, "request failed");
                json!({"error": error.to_string(), "code": code})
            }
            error => json!({"error": error.to_string(), "code": code}),
        };

        (status, Json(body)).into_response()
    }
}

/// Name of the violated unique constraint, if `error` is a unique violation.
pub fn unique_violation(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or("unique").to_string())
        }
        _ => None,
    }
}
