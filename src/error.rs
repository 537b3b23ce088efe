//! Error handling for the API.
//!
//! Prefer adding a variant to [LodgeError] over squeezing a new failure
//! into `Invalid` or `Database`. Each variant documents its HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use sqlx::error::ErrorKind;

/// The error enum for all error handling across the API.
#[derive(Debug, thiserror::Error)]
pub enum LodgeError {
    /// \[404\] The requested record does not exist.
    #[error("{0}")]
    NotFound(String),
    /// \[400\] The request would break a rule of the lodge's data model.
    #[error("{0}")]
    Invalid(String),
    /// \[409\] The record is still referenced elsewhere, or would duplicate
    /// a unique value.
    #[error("{0}")]
    Conflict(String),
    /// \[401\] The request requires a user forwarded by the host.
    #[error("login required")]
    Unauthorized,
    /// \[403\] The current user may not perform the action.
    ///
    /// Carries the missing requirement (e.g. "staff") when there is one.
    #[error("access forbidden{}", .0.as_ref().map(|required| format!(": {}", required)).unwrap_or_default())]
    Forbidden(Option<String>),
    /// \[500\] An error occurred while talking to the database.
    #[error("database error: {0}")]
    Database(sqlx::Error),
    /// \[500\] The schema migrations could not be applied.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    /// \[500\] The service is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),
}

/// The return type for all model operations.
pub type LodgeResult<T> = Result<T, LodgeError>;

impl LodgeError {
    pub fn status(&self) -> StatusCode {
        match self {
            LodgeError::NotFound(_) => StatusCode::NOT_FOUND,
            LodgeError::Invalid(_) => StatusCode::BAD_REQUEST,
            LodgeError::Conflict(_) => StatusCode::CONFLICT,
            LodgeError::Unauthorized => StatusCode::UNAUTHORIZED,
            LodgeError::Forbidden(_) => StatusCode::FORBIDDEN,
            LodgeError::Database(_) | LodgeError::Migration(_) | LodgeError::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn as_json(&self) -> Value {
        let mut json_val = match self {
            LodgeError::Forbidden(Some(requirement)) => json!({ "required": requirement }),
            LodgeError::Database(error) => json!({ "error": error.to_string() }),
            LodgeError::Migration(error) => json!({ "error": error.to_string() }),
            _ => json!({}),
        };

        json_val["statusCode"] = json!(self.status().as_u16());
        json_val["message"] = json!(self.to_string());

        json_val
    }

    pub fn not_found(what: &str, id: i64) -> Self {
        LodgeError::NotFound(format!("No {} with id {}", what, id))
    }
}

const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

impl From<sqlx::Error> for LodgeError {
    fn from(error: sqlx::Error) -> Self {
        let violation = match &error {
            sqlx::Error::RowNotFound => {
                return LodgeError::NotFound("Record not found".to_owned());
            }
            // SQLite reports `ON DELETE RESTRICT` under its trigger code
            sqlx::Error::Database(db_error)
                if db_error.code().as_deref() == Some(SQLITE_CONSTRAINT_TRIGGER) =>
            {
                Some((ErrorKind::ForeignKeyViolation, db_error.message().to_owned()))
            }
            sqlx::Error::Database(db_error) => {
                Some((db_error.kind(), db_error.message().to_owned()))
            }
            _ => None,
        };

        match violation {
            Some((ErrorKind::ForeignKeyViolation, _)) => LodgeError::Conflict(
                "The record is missing a referenced record or is still referenced by another"
                    .to_owned(),
            ),
            Some((ErrorKind::UniqueViolation, message)) => LodgeError::Conflict(format!(
                "A record with the same unique value already exists: {}",
                message
            )),
            Some((ErrorKind::CheckViolation | ErrorKind::NotNullViolation, message)) => {
                LodgeError::Invalid(format!("Invalid value: {}", message))
            }
            _ => LodgeError::Database(error),
        }
    }
}

impl IntoResponse for LodgeError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (self.status(), Json(self.as_json())).into_response()
    }
}
