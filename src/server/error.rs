use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::imagegen::ImageGenError;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by HTTP handlers, rendered as `{ "error": message }`.
#[derive(Debug)]
pub enum ApiError {
    ImageGen(ImageGenError),
    /// The request body was missing, not JSON, or the wrong shape.
    InvalidBody(JsonRejection),
    NotFound(&'static str),
    /// No credentials were supplied.
    Unauthorized(&'static str),
    /// Credentials were supplied but are not valid.
    Forbidden(&'static str),
    Database(sqlx::Error),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::ImageGen(e) => write!(f, "{}", e),
            ApiError::InvalidBody(rejection) => write!(f, "{}", rejection.body_text()),
            ApiError::NotFound(msg) | ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => {
                write!(f, "{}", msg)
            }
            ApiError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<ImageGenError> for ApiError {
    fn from(e: ImageGenError) -> Self {
        ApiError::ImageGen(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ImageGen(e) => (e.status(), e.to_string()),
            ApiError::InvalidBody(rejection) => (rejection.status(), rejection.body_text()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            ApiError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imagegen::Provider;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                ApiError::ImageGen(ImageGenError::MissingKey(Provider::DeepAi)),
                StatusCode::FORBIDDEN,
            ),
            (ApiError::NotFound("Manual not found"), StatusCode::NOT_FOUND),
            (ApiError::Unauthorized("No token provided"), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("Invalid token"), StatusCode::FORBIDDEN),
            (ApiError::Database(sqlx::Error::PoolClosed), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
