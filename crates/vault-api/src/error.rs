//! Mapping from catalog errors to HTTP responses.

use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use vault_core::{Error, ValidationErrors};

/// Message returned for every server-side failure. Details go to the log only.
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One message per offending field.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Malformed request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Storage, decode or deadline failure.
    #[error("internal error: {0}")]
    Internal(Error),

    /// An import stopped part-way; earlier records stay committed.
    #[error("import failed at record {failed_record} after {imported} imported: {source}")]
    ImportFailed {
        imported: usize,
        failed_record: usize,
        source: Error,
    },
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(errors) => ApiError::Validation(errors),
            Error::Import {
                index,
                imported,
                source,
            } => ApiError::ImportFailed {
                imported,
                failed_record: index,
                source: *source,
            },
            other => ApiError::Internal(other),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "error": errors }),
            ),
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, serde_json::json!({ "error": message }))
            }
            ApiError::Internal(err) => {
                error!(
                    subsystem = "api",
                    kind = ?err.kind(),
                    error = %err,
                    "Request failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": SERVER_ERROR_MESSAGE }),
                )
            }
            ApiError::ImportFailed {
                imported,
                failed_record,
                source,
            } => {
                error!(
                    subsystem = "api",
                    kind = ?source.kind(),
                    imported,
                    failed_record,
                    error = %source,
                    "Import failed"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({
                        "error": SERVER_ERROR_MESSAGE,
                        "imported": imported,
                        "failed_record": failed_record,
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
