//! Application error type.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::consolidated::TimetableError;
use crate::domain::InvalidStopId;
use crate::otp::OtpError;

use super::dto::ErrorResponse;

#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<InvalidStopId> for AppError {
    fn from(e: InvalidStopId) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<OtpError> for AppError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::StopNotFound(id) => AppError::NotFound {
                message: format!("Stop {id} not found"),
            },
            _ => AppError::Internal {
                message: format!("Error fetching stop data: {e}"),
            },
        }
    }
}

impl From<TimetableError> for AppError {
    fn from(e: TimetableError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;

    #[test]
    fn status_mapping() {
        let bad = AppError::from(StopId::parse("14264").unwrap_err());
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(OtpError::StopNotFound("vitrasa:1".into()));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let upstream = AppError::from(OtpError::Api {
            status: 502,
            message: "Bad Gateway".into(),
        });
        assert_eq!(upstream.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
