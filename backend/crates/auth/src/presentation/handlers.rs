//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;
use std::sync::Arc;

use crate::application::VerifyEmailUseCase;
use crate::domain::repository::AllowListRepository;
use crate::error::AuthResult;
use crate::presentation::dto::{VerifyEmailRequest, VerifyEmailResponse};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AllowListRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
}

// ============================================================================
// Verify Email
// ============================================================================

/// POST /api/auth/verify-email
///
/// 200 `{allowed: true, displayName?}` or 403 `{allowed: false}`.
pub async fn verify_email<R>(
    State(state): State<AuthAppState<R>>,
    body: Result<Json<VerifyEmailRequest>, JsonRejection>,
) -> AuthResult<Response>
where
    R: AllowListRepository + Send + Sync + 'static,
{
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return Ok(AppError::bad_request(rejection.body_text()).into_response());
        }
    };

    let decision = VerifyEmailUseCase::new(state.repo.clone())
        .execute(&req.email)
        .await?;

    let status = if decision.allowed {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };

    Ok((
        status,
        Json(VerifyEmailResponse {
            allowed: decision.allowed,
            display_name: decision.display_name,
        }),
    )
        .into_response())
}
