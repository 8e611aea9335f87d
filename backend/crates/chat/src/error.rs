//! Chat Error Types
//!
//! This module provides chat-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Remote failures are classified here and logged with their details;
//! clients only ever see a generic message.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::assistant::RemoteServiceError;
use crate::domain::value_objects::RunStatus;

/// Chat-specific result type alias
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat-specific error variants
#[derive(Debug, Error)]
pub enum ChatError {
    /// Conversation missing or owned by someone else
    #[error("Conversation not found")]
    ConversationNotFound,

    /// Request failed validation
    #[error("{0}")]
    InvalidInput(String),

    /// Upload over the size limit
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Remote assistant call failed
    #[error("Assistant service error: {0}")]
    Remote(#[from] RemoteServiceError),

    /// Run ended in failed, expired or incomplete
    #[error("Assistant run {run_id} ended with status {status}")]
    RunFailed { run_id: String, status: RunStatus },

    /// Run was cancelled on the provider side
    #[error("Assistant run {run_id} was cancelled")]
    RunCancelled { run_id: String },

    /// Poll budget exhausted
    #[error("Assistant run {run_id} did not complete after {attempts} status checks")]
    RunTimeout { run_id: String, attempts: u32 },

    /// Latest thread message is not an assistant text reply
    #[error("Assistant produced no reply")]
    NoReply,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Export rendering failed
    #[error("Export rendering failed: {0}")]
    Render(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::ConversationNotFound => ErrorKind::NotFound,
            ChatError::InvalidInput(_) => ErrorKind::BadRequest,
            ChatError::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            ChatError::Remote(err) => remote_error_kind(err),
            ChatError::RunFailed { .. } | ChatError::RunCancelled { .. } | ChatError::NoReply => {
                ErrorKind::BadGateway
            }
            ChatError::RunTimeout { .. } => ErrorKind::GatewayTimeout,
            ChatError::Database(_) | ChatError::Render(_) | ChatError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError with a client-safe message
    pub fn to_app_error(&self) -> AppError {
        match self {
            ChatError::ConversationNotFound
            | ChatError::InvalidInput(_)
            | ChatError::PayloadTooLarge(_) => AppError::new(self.kind(), self.to_string()),
            ChatError::Remote(_) => match self.kind() {
                ErrorKind::ServiceUnavailable => AppError::new(
                    self.kind(),
                    "The assistant service is busy",
                )
                .with_action("Please try again in a few moments"),
                ErrorKind::GatewayTimeout => {
                    AppError::new(self.kind(), "The assistant service did not respond in time")
                        .with_action("Please try again")
                }
                ErrorKind::BadGateway => {
                    AppError::new(self.kind(), "The assistant service is unavailable")
                        .with_action("Please try again")
                }
                _ => AppError::new(self.kind(), "Internal server error"),
            },
            ChatError::RunFailed { .. } | ChatError::RunCancelled { .. } => {
                AppError::new(self.kind(), "The assistant could not process the request")
                    .with_action("Please try again")
            }
            ChatError::RunTimeout { .. } => {
                AppError::new(self.kind(), "Timed out waiting for the assistant's reply")
                    .with_action("Please try again")
            }
            ChatError::NoReply => AppError::new(self.kind(), "No reply was received"),
            ChatError::Database(_) | ChatError::Render(_) | ChatError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ChatError::Database(e) => {
                tracing::error!(error = %e, "Chat database error");
            }
            ChatError::Remote(e) => {
                tracing::error!(
                    error = %e,
                    upstream_status = e.status(),
                    "Assistant service call failed"
                );
            }
            ChatError::RunFailed { run_id, status } => {
                tracing::error!(run_id = %run_id, status = %status, "Assistant run failed");
            }
            ChatError::RunCancelled { run_id } => {
                tracing::warn!(run_id = %run_id, "Assistant run cancelled");
            }
            ChatError::RunTimeout { run_id, attempts } => {
                tracing::warn!(run_id = %run_id, attempts = attempts, "Assistant run timed out");
            }
            ChatError::NoReply => {
                tracing::warn!("Assistant run completed without a text reply");
            }
            ChatError::Render(msg) | ChatError::Internal(msg) => {
                tracing::error!(message = %msg, "Chat internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Chat error");
            }
        }
    }
}

/// Upstream status → our status
///
/// Auth failures upstream mean our credentials are wrong (500); upstream
/// throttling is reported as 503.
fn remote_error_kind(err: &RemoteServiceError) -> ErrorKind {
    match err {
        RemoteServiceError::Status { status, .. } => match status {
            401 | 403 => ErrorKind::InternalServerError,
            429 => ErrorKind::ServiceUnavailable,
            408 => ErrorKind::GatewayTimeout,
            // 5xx and any other unexpected status
            _ => ErrorKind::BadGateway,
        },
        RemoteServiceError::Transport(_) | RemoteServiceError::Decode(_) => ErrorKind::BadGateway,
        RemoteServiceError::Timeout => ErrorKind::GatewayTimeout,
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> ChatError {
        ChatError::Remote(RemoteServiceError::Status {
            status: code,
            message: "upstream detail".into(),
        })
    }

    #[test]
    fn test_remote_error_mapping() {
        assert_eq!(status(401).kind(), ErrorKind::InternalServerError);
        assert_eq!(status(403).kind(), ErrorKind::InternalServerError);
        assert_eq!(status(429).kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(status(500).kind(), ErrorKind::BadGateway);
        assert_eq!(status(503).kind(), ErrorKind::BadGateway);
        assert_eq!(
            ChatError::Remote(RemoteServiceError::Transport("reset".into())).kind(),
            ErrorKind::BadGateway
        );
        assert_eq!(
            ChatError::Remote(RemoteServiceError::Timeout).kind(),
            ErrorKind::GatewayTimeout
        );
    }

    #[test]
    fn test_run_error_mapping() {
        let failed = ChatError::RunFailed {
            run_id: "run_1".into(),
            status: RunStatus::Expired,
        };
        assert_eq!(failed.kind(), ErrorKind::BadGateway);
        assert_eq!(ChatError::NoReply.kind(), ErrorKind::BadGateway);
        assert_eq!(
            ChatError::RunTimeout {
                run_id: "run_1".into(),
                attempts: 60
            }
            .kind(),
            ErrorKind::GatewayTimeout
        );
    }

    #[test]
    fn test_upstream_details_are_not_exposed() {
        let app_err = status(500).to_app_error();
        assert!(!app_err.message().contains("upstream detail"));

        let app_err = status(401).to_app_error();
        assert_eq!(app_err.message(), "Internal server error");
    }

    #[test]
    fn test_client_errors_keep_message() {
        let app_err = ChatError::InvalidInput("Message text is required".into()).to_app_error();
        assert_eq!(app_err.kind(), ErrorKind::BadRequest);
        assert_eq!(app_err.message(), "Message text is required");
    }
}
