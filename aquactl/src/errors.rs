use crate::chemistry::ChemistryError;
use crate::db::errors::{Constraint, DbError};
use crate::types::{Operation, Permission};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

/// Errors returned by HTTP handlers.
///
/// `Display` is for logs and may carry internal detail; clients only ever see
/// [`Error::user_message`].
#[derive(ThisError, Debug)]
pub enum Error {
    /// No proxy header on the request, or the user could not be provisioned
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    #[error("Role lacks {required:?} needed to {action:?} {resource}")]
    InsufficientPermissions {
        required: Permission,
        action: Operation,
        resource: String,
    },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{resource} {id} does not exist")]
    NotFound { resource: String, id: String },

    /// Water parameters rejected by the calculator
    #[error("Calculation error: {0}")]
    Calculation(#[from] ChemistryError),

    #[error("Failed to {operation}")]
    Internal { operation: String },

    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            Error::NotFound { .. } | Error::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            Error::Database(DbError::UniqueViolation(_)) => StatusCode::CONFLICT,
            Error::BadRequest { .. }
            | Error::Calculation(_)
            | Error::Database(DbError::ForeignKeyViolation(_) | DbError::CheckViolation(_)) => StatusCode::BAD_REQUEST,
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to send to the client.
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Sign in through the proxy to use this endpoint".to_string()),
            Error::InsufficientPermissions { action, resource, .. } => {
                format!("Your role does not allow you to {action} {resource}")
            }
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { resource, id } => format!("{resource} {id} does not exist"),
            Error::Calculation(err) => format!("Calculation error: {err}"),
            Error::Database(DbError::NotFound) => "Record not found".to_string(),
            Error::Database(DbError::UniqueViolation(constraint)) => duplicate_message(constraint).to_string(),
            Error::Database(DbError::ForeignKeyViolation(_)) => "Referenced record does not exist".to_string(),
            Error::Database(DbError::CheckViolation(constraint)) => rejected_value_message(constraint).to_string(),
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

fn duplicate_message(constraint: &Constraint) -> &'static str {
    if constraint.is("users_email_key") {
        "A user with this email address already exists"
    } else {
        "Record already exists"
    }
}

fn rejected_value_message(constraint: &Constraint) -> &'static str {
    if constraint.is("water_analyses_ph_range") {
        "pH must be between 0 and 14"
    } else if constraint.is("water_analyses_score_range") {
        "Stability score must be between 0 and 100"
    } else {
        "Invalid data provided"
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %format!("{self:#}"), "request failed");
        } else if matches!(self, Error::Database(_)) {
            tracing::warn!(error = %self, "database constraint rejected request");
        } else if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::info!(error = %self, "request not authorized");
        } else {
            tracing::debug!(error = %self, "client error");
        }

        match &self {
            Error::Calculation(_) => (status, Json(json!({ "error": self.user_message() }))).into_response(),
            Error::Database(DbError::UniqueViolation(constraint)) => {
                let resource = constraint.table.as_deref().unwrap_or("unknown");
                (status, Json(json!({ "message": self.user_message(), "resource": resource }))).into_response()
            }
            _ => (status, self.user_message()).into_response(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn calculation_errors_are_json_bad_requests() {
        let err = Error::Calculation(ChemistryError::NonPositive {
            parameter: "hardness",
            value: 0.0,
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["error"],
            "Calculation error: hardness must be greater than zero (got 0)"
        );
    }

    #[test]
    fn database_errors_map_to_status_codes() {
        assert_eq!(Error::Database(DbError::NotFound).status_code(), StatusCode::NOT_FOUND);

        let duplicate_email = Error::Database(DbError::UniqueViolation(Constraint {
            name: Some("users_email_key".to_string()),
            table: Some("users".to_string()),
            detail: "duplicate key value violates unique constraint".to_string(),
        }));
        assert_eq!(duplicate_email.status_code(), StatusCode::CONFLICT);
        assert_eq!(duplicate_email.user_message(), "A user with this email address already exists");

        let bad_ph = Error::Database(DbError::CheckViolation(Constraint {
            name: Some("water_analyses_ph_range".to_string()),
            table: Some("water_analyses".to_string()),
            detail: "new row violates check constraint".to_string(),
        }));
        assert_eq!(bad_ph.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(bad_ph.user_message(), "pH must be between 0 and 14");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = Error::Other(anyhow::anyhow!("connection refused to 10.0.0.1"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.user_message(), "Internal server error");
    }
}
