//! HTTP error responses.
//!
//! Every handler error becomes `{"message": ..., "field": ...}` with the
//! status code of the underlying `VoiceEaseError`. Server-side failures are
//! logged and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use voiceease_shared::VoiceEaseError;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub VoiceEaseError);

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// `{"message": ...}` acknowledgement body
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        ApiError(VoiceEaseError::NotFound(what.to_string()))
    }

    pub fn unauthorized() -> Self {
        ApiError(VoiceEaseError::Unauthorized)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(VoiceEaseError::Storage(format!("{:#}", err)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = if self.0.is_server_error() {
            error!("  Request failed: {}", self.0);
            ErrorBody {
                message: "Internal Server Error".to_string(),
                field: None,
            }
        } else {
            ErrorBody {
                message: self.0.to_string(),
                field: self.0.field().map(str::to_string),
            }
        };

        (status, Json(body)).into_response()
    }
}
