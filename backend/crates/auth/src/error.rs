//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session cookie on the request
    #[error("Authentication required")]
    SessionMissing,

    /// Bad signature, unknown session or malformed token
    #[error("Session not found or invalid")]
    SessionInvalid,

    /// Session row exists but is past `expires_at_ms`
    #[error("Session expired")]
    SessionExpired,

    /// Email not on the allow-list (or inactive)
    #[error("Access denied")]
    NotAllowed,

    /// Email failed validation
    #[error("{0}")]
    InvalidEmail(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::SessionMissing | AuthError::SessionInvalid | AuthError::SessionExpired => {
                ErrorKind::Unauthorized
            }
            AuthError::NotAllowed => ErrorKind::Forbidden,
            AuthError::InvalidEmail(_) => ErrorKind::BadRequest,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay out of the client message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::SessionMissing | AuthError::SessionInvalid | AuthError::SessionExpired => {
                AppError::new(self.kind(), self.to_string()).with_action("Please sign in again")
            }
            AuthError::NotAllowed => AppError::new(self.kind(), self.to_string())
                .with_action("Contact the administrator to request access"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            AuthError::InvalidEmail(_) => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::NotAllowed => {
                tracing::warn!("Access attempt from email outside the allow-list");
            }
            AuthError::SessionInvalid => {
                tracing::warn!("Invalid session token presented");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::InvalidEmail(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(AuthError::SessionMissing.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::SessionExpired.kind(), ErrorKind::Unauthorized);
        assert_eq!(AuthError::NotAllowed.kind(), ErrorKind::Forbidden);
        assert_eq!(
            AuthError::InvalidEmail("bad".into()).kind(),
            ErrorKind::BadRequest
        );
        assert_eq!(
            AuthError::Internal("boom".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let app_err = AuthError::Internal("connection string leaked".into()).to_app_error();
        assert_eq!(app_err.message(), "Internal server error");
    }

    #[test]
    fn test_from_validation_error() {
        let err: AuthError = AppError::bad_request("Invalid email format").into();
        assert!(matches!(err, AuthError::InvalidEmail(msg) if msg == "Invalid email format"));
    }
}
