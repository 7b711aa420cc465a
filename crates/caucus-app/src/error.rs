use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Response, Scribe};
use serde::Serialize;
use thiserror::Error;

use caucus_db::error::DbError;
use caucus_service::error::ServiceError;
use caucus_service::validation::Violations;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] caucus_core::error::CoreError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    #[error("Length required")]
    LengthRequired,

    #[error("Payload too large: limit is {limit} bytes")]
    PayloadTooLarge { limit: u64 },
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

/// ## Summary
/// Field-level validation failure payload
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    pub errors: Violations,
}

fn internal(res: &mut Response, error: &dyn std::fmt::Display) {
    tracing::error!(error = %error, "Request failed");
    res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
    res.render(Json(ErrorResponse {
        error: "Internal server error".to_owned(),
        details: Some(error.to_string()),
    }));
}

fn render_service_error(error: ServiceError, res: &mut Response) {
    let (status, message) = match error {
        ServiceError::Validation(violations) => {
            tracing::debug!(%violations, "Validation failed");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ValidationResponse { errors: violations }));
            return;
        }
        ServiceError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        ServiceError::CsvError(e) => (StatusCode::BAD_REQUEST, format!("Malformed CSV: {e}")),
        ServiceError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        ServiceError::Conflict(message) => (StatusCode::CONFLICT, message),
        ServiceError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Unauthorized".to_owned()),
        ServiceError::InvalidCredentials => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
        }
        other => return internal(res, &other),
    };

    tracing::debug!(%status, %message, "Request rejected");
    res.status_code(status);
    res.render(Json(ErrorResponse::new(message)));
}

impl Scribe for AppError {
    fn render(self, res: &mut Response) {
        match self {
            Self::ServiceError(e) => render_service_error(e, res),
            Self::BadRequest(message) => {
                res.status_code(StatusCode::BAD_REQUEST);
                res.render(Json(ErrorResponse::new(message)));
            }
            Self::Unauthorized(message) => {
                res.status_code(StatusCode::UNAUTHORIZED);
                res.render(Json(ErrorResponse::new(message)));
            }
            Self::LengthRequired => {
                res.status_code(StatusCode::LENGTH_REQUIRED);
                res.render(Json(ErrorResponse::new(
                    "Uploads must declare a Content-Length",
                )));
            }
            Self::PayloadTooLarge { limit } => {
                res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
                res.render(Json(ErrorResponse::new(format!(
                    "File exceeds the {limit} byte upload limit"
                ))));
            }
            other @ (Self::DatabaseError(_) | Self::CoreError(_)) => internal(res, &other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
