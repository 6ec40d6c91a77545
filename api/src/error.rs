use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parley_core::credentials::StoreError;
use parley_core::error::{self, ApiError};
use parley_core::status::KeyStatusError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Requester is not allowed to perform the query (401)
    Unauthorized {
        message: String,
        docs_hint: Option<String>,
    },
    /// Credential store not configured or unreachable (500, generic body)
    StoreUnavailable(StoreError),
    /// Chat storage write failed (500, underlying message included)
    Persistence(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // TODO: take the request id from a middleware-set extension instead
        // of minting one per error
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => (
                StatusCode::BAD_REQUEST,
                ApiError {
                    error: error::codes::VALIDATION_FAILED.to_string(),
                    message,
                    field,
                    received,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::Unauthorized { message, docs_hint } => (
                StatusCode::UNAUTHORIZED,
                ApiError {
                    error: error::codes::UNAUTHORIZED.to_string(),
                    message,
                    field: None,
                    received: None,
                    request_id,
                    docs_hint,
                },
            ),
            AppError::StoreUnavailable(err) => {
                // The reason stays in the logs; the response body carries no
                // infrastructure state.
                tracing::error!(reason = err.reason(), "credential store unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::INTERNAL_ERROR.to_string(),
                        message: "An internal error occurred".to_string(),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
            AppError::Persistence(message) => {
                tracing::error!(error = %message, "chat persistence failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::PERSISTENCE_FAILED.to_string(),
                        message,
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<KeyStatusError> for AppError {
    fn from(err: KeyStatusError) -> Self {
        match err {
            KeyStatusError::Unauthorized => AppError::Unauthorized {
                message: "You may only query your own provider key status".to_string(),
                docs_hint: Some(
                    "The userId in the request body must match the authenticated user."
                        .to_string(),
                ),
            },
            KeyStatusError::Store(store_err) => AppError::StoreUnavailable(store_err),
        }
    }
}

impl From<parley_core::chats::PersistenceError> for AppError {
    fn from(err: parley_core::chats::PersistenceError) -> Self {
        AppError::Persistence(err.0)
    }
}
