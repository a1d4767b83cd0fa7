//! Error types for web handlers.
//!
//! This module defines error types that bridge between domain errors
//! and HTTP responses, implementing Axum's `IntoResponse` trait.
//!
//! | Domain outcome                 | Status | Code                   |
//! |--------------------------------|--------|------------------------|
//! | malformed scan code            | 422    | `MALFORMED_CODE`       |
//! | ticket already used (conflict) | 409    | `ALREADY_USED`         |
//! | ticket not found               | 404    | `NOT_FOUND`            |
//! | registry unreachable           | 503    | `REGISTRY_UNAVAILABLE` |
//! | corrupt registry record        | 500    | `INTERNAL_SERVER_ERROR`|

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use ticket_gate_core::{CheckInError, CodecError, RegistryError, VerdictKind};

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses with a
/// `{ "code", "message" }` JSON body.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Ticket>, AppError> {
///     let identity = codec::decode(&request.code)?;
///     Ok(Json(state.coordinator.check_in(&identity).await?))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND".to_string())
    }

    /// Create a 409 Conflict error with a specific code.
    #[must_use]
    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), code.to_string())
    }

    /// Create a 422 Unprocessable Entity error for an unreadable scan code.
    #[must_use]
    pub fn malformed_code(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "MALFORMED_CODE".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error for an unreachable registry.
    #[must_use]
    pub fn registry_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "REGISTRY_UNAVAILABLE".to_string(),
        )
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Request failed"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Request failed"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        Self::malformed_code(VerdictKind::MalformedInput.operator_message())
            .with_source(anyhow::Error::new(err))
    }
}

impl From<CheckInError> for AppError {
    fn from(err: CheckInError) -> Self {
        let message = err.operator_message();
        let error = match &err {
            CheckInError::AlreadyUsed { .. } => Self::conflict("ALREADY_USED", message),
            CheckInError::NotVerified => Self::conflict("NOT_VERIFIED", message),
            CheckInError::NotFound(_) => Self::not_found(message),
            CheckInError::RegistryUnavailable(_) => Self::registry_unavailable(message),
        };
        error.with_source(anyhow::Error::new(err))
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        let error = match &err {
            RegistryError::Unavailable(_) => {
                Self::registry_unavailable(VerdictKind::RegistryUnavailable.operator_message())
            }
            RegistryError::InvalidRecord(_) => Self::internal("An internal error occurred"),
            RegistryError::NotFound(_) => Self::not_found(err.to_string()),
            RegistryError::AlreadyUsed { .. } => Self::conflict("ALREADY_USED", err.to_string()),
            RegistryError::AlreadyIssued(_) => Self::conflict("ALREADY_ISSUED", err.to_string()),
        };
        error.with_source(anyhow::Error::new(err))
    }
}
