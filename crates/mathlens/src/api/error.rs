//! Mapping of solve errors onto HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mathlens_core::{SolveError, UploadError};
use serde::Serialize;

/// Error body: `{"error": ..., "detail"?: ...}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// A solve error on its way to the client.
#[derive(Debug)]
pub struct ApiError {
    error: SolveError,
    expose_upstream: bool,
}

impl ApiError {
    pub fn new(error: SolveError, expose_upstream: bool) -> Self {
        Self {
            error,
            expose_upstream,
        }
    }
}

/// Status code for each error kind.
pub fn status_for(error: &SolveError) -> StatusCode {
    match error {
        SolveError::NotConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        SolveError::InvalidUpload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        SolveError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
        SolveError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SolveError::UpstreamHttp { .. } | SolveError::UpstreamUnavailable { .. } => {
            StatusCode::BAD_GATEWAY
        }
        SolveError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        let result = self.error.to_error_result(self.expose_upstream);
        let body = ErrorBody {
            error: result.message,
            detail: result.detail,
        };

        let mut response = (status, Json(body)).into_response();
        if let SolveError::RateLimited {
            retry_after_secs, ..
        } = self.error
        {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
