//! JSON error responses for the REST API.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::NoteError;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error leaving a handler, carrying its HTTP status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        let status = match &err {
            NoteError::NoteNotFound { .. } => StatusCode::NOT_FOUND,
            NoteError::ValidationFailed { .. } | NoteError::InvalidCommand { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => {
                error!("Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(NoteError::NoteNotFound { id: 3 }).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(NoteError::validation("empty")).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(NoteError::invalid_command("bad")).status,
            StatusCode::BAD_REQUEST
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(
            ApiError::from(NoteError::Io(io)).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
