use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookdate_core::errors::Error as CoreError;
use bookdate_lookup::LookupError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// A batch run failed after it started.
    #[error("{0}")]
    Core(#[from] CoreError),
    /// A catalogue request behind a proxy endpoint failed.
    #[error("{0}")]
    Lookup(#[from] LookupError),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(_) | ApiError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Lookup(
                LookupError::InvalidIdentifier(_) | LookupError::InvalidQuery(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::Lookup(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "Invalid request",
            ApiError::Core(_) => "Failed to process the request",
            ApiError::Lookup(_) if self.status() == StatusCode::BAD_REQUEST => "Invalid request",
            ApiError::Lookup(_) => "Failed to reach Google Books",
            ApiError::Anyhow(_) => "Internal error",
        }
    }

    /// Failures an operator fixes in the deployment rather than in code.
    fn is_configuration(&self) -> bool {
        matches!(self, ApiError::Core(e) if e.is_configuration())
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Core(e) => Some(format!("{:?}", e)),
            ApiError::Lookup(e) if self.status() == StatusCode::BAD_GATEWAY => {
                Some(format!("{:?}", e))
            }
            ApiError::Anyhow(e) => Some(format!("{:#}", e)),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_configuration() {
            tracing::warn!("{}: {}", self.label(), self);
        } else if status.is_server_error() {
            tracing::error!("{}: {}", self.label(), self);
        }

        let body = Json(ErrorBody {
            code: status.as_u16(),
            error: self.label().to_string(),
            message: self.to_string(),
            details: self.details(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
