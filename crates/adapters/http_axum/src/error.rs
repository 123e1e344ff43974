//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use dsbridge_domain::error::{DsBridgeError, NotFoundError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`DsBridgeError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(DsBridgeError);

impl ApiError {
    /// No server is configured under `slug`.
    #[must_use]
    pub fn unknown_server(slug: &str) -> Self {
        Self(
            NotFoundError {
                entity: "Server",
                id: slug.to_string(),
            }
            .into(),
        )
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DsBridgeError::Validation(_) => StatusCode::BAD_REQUEST,
            DsBridgeError::NotFound(_) => StatusCode::NOT_FOUND,
            DsBridgeError::Communication(_) => StatusCode::BAD_GATEWAY,
            DsBridgeError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            DsBridgeError::Configuration(_) | DsBridgeError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<DsBridgeError> for ApiError {
    fn from(err: DsBridgeError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            DsBridgeError::Validation(err) => err.to_string(),
            DsBridgeError::NotFound(err) => err.to_string(),
            DsBridgeError::NotReady(err) => err.to_string(),
            DsBridgeError::Communication(err) => {
                tracing::warn!(error = %err, "digitalSTROM server call failed");
                "digitalSTROM server unreachable".to_string()
            }
            DsBridgeError::Configuration(err) => {
                tracing::error!(error = %err, "configuration error");
                "internal server error".to_string()
            }
            DsBridgeError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
