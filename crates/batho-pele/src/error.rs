use crate::auth::{LoginError, SessionError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::intake::VerificationError;
use crate::workflows::resources::ResourceImportError;
use crate::workflows::treatment::TreatmentError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Verification(VerificationError),
    Resources(ResourceImportError),
    Treatment(TreatmentError),
    Login(LoginError),
    Session(SessionError),
    BadRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Verification(err) => write!(f, "verification error: {}", err),
            AppError::Resources(err) => write!(f, "resource sheet error: {}", err),
            AppError::Treatment(err) => write!(f, "treatment error: {}", err),
            AppError::Login(err) => write!(f, "login failed: {}", err),
            AppError::Session(err) => write!(f, "unauthorized: {}", err),
            AppError::BadRequest(message) => write!(f, "bad request: {}", message),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Verification(err) => Some(err),
            AppError::Resources(err) => Some(err),
            AppError::Treatment(err) => Some(err),
            AppError::Login(err) => Some(err),
            AppError::Session(err) => Some(err),
            AppError::BadRequest(_) => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Resources(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Treatment(TreatmentError::UnknownCondition(_)) => StatusCode::NOT_FOUND,
            AppError::Treatment(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Login(LoginError::InvalidCredentials { .. }) | AppError::Session(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Login(LoginError::LockedOut { .. }) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Verification(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Login(LoginError::InvalidCredentials { remaining }) => Json(json!({
                "error": self.to_string(),
                "remaining_attempts": remaining,
            })),
            AppError::Login(LoginError::LockedOut { until }) => Json(json!({
                "error": self.to_string(),
                "locked_until": until,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<VerificationError> for AppError {
    fn from(value: VerificationError) -> Self {
        Self::Verification(value)
    }
}

impl From<ResourceImportError> for AppError {
    fn from(value: ResourceImportError) -> Self {
        Self::Resources(value)
    }
}

impl From<TreatmentError> for AppError {
    fn from(value: TreatmentError) -> Self {
        Self::Treatment(value)
    }
}

impl From<LoginError> for AppError {
    fn from(value: LoginError) -> Self {
        Self::Login(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}
