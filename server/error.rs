use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use subway_lines::api::ErrorResponse;
use subway_lines::service::{ErrorKind, ServiceError};

/// A service failure rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self.0);
        } else {
            log::debug!("Request rejected: {}", self.0);
        }

        HttpResponse::build(status).json(ErrorResponse {
            code: self.0.code().to_string(),
            message: self.0.to_string(),
        })
    }
}

/// Body for a path segment that is not a valid ID
pub fn invalid_id(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        code: "INVALID_ID".to_string(),
        message: message.into(),
    }
}

/// Body for requests the JSON or query extractors could not parse
pub fn malformed_body(message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        code: "MALFORMED_REQUEST".to_string(),
        message: message.into(),
    }
}
