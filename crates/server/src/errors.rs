use artmeta::MetadataError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Client errors render as `{ "error": ... }`; everything else renders as
/// `{ "status": "error", "message": ... }`.
pub enum AppError {
    /// The request itself is unusable (missing or malformed input).
    BadRequest(String),
    /// The JSON body could not be extracted.
    Rejection(JsonRejection),
    /// A failure from the generation pipeline.
    Metadata {
        error: MetadataError,
        expose_details: bool,
    },
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl AppError {
    pub fn metadata(error: MetadataError, expose_details: bool) -> Self {
        AppError::Metadata {
            error,
            expose_details,
        }
    }
}

/// Conversion from `JsonRejection` to `AppError`.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Rejection(rejection)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

fn client_error(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn server_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => client_error(StatusCode::BAD_REQUEST, message),
            AppError::Rejection(rejection) => {
                // Wrong shape and missing content type are both plain bad requests;
                // an oversized body keeps its 413.
                let status = match rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::BAD_REQUEST,
                    ref other => match other.status() {
                        StatusCode::UNPROCESSABLE_ENTITY => StatusCode::BAD_REQUEST,
                        status => status,
                    },
                };
                client_error(status, rejection.body_text())
            }
            AppError::Metadata {
                error,
                expose_details,
            } => {
                if let MetadataError::Validation(message) = error {
                    return client_error(StatusCode::BAD_REQUEST, message);
                }
                let kind = error.kind();
                // Log the original error for debugging purposes
                error!(kind = kind.as_str(), "MetadataError: {:?}", error);
                let message = if expose_details {
                    error.to_string()
                } else {
                    error.public_message().to_string()
                };
                server_error(message)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                server_error("An internal server error occurred.".to_string())
            }
        }
    }
}
