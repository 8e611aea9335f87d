//! Auth Middleware
//!
//! Session + allow-list gate for protected routes.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::id::UserId;
use platform::client::AuthenticatedSubject;
use std::sync::Arc;

use crate::application::AuthorizeRequestUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::{AllowListRepository, AuthSessionRepository};
use crate::domain::value_object::email::Email;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<R>
where
    R: AuthSessionRepository + AllowListRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthMiddlewareState<R>
where
    R: AuthSessionRepository + AllowListRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Allow-listed caller, stored in request extensions by
/// [`require_allowed_session`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub email: Email,
    pub display_name: Option<String>,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::SessionMissing)
    }
}

/// Middleware that requires a valid session for an allow-listed email
///
/// 401 without a valid session, 403 when the email is not allowed.
pub async fn require_allowed_session<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AuthSessionRepository + AllowListRepository + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);

    let use_case = AuthorizeRequestUseCase::new(state.repo.clone(), state.config.clone());

    let authorized = match use_case.execute(token.as_deref()).await {
        Ok(authorized) => authorized,
        Err(e) => return e.into_response(),
    };

    req.extensions_mut()
        .insert(AuthenticatedSubject(authorized.user_id.to_string()));
    req.extensions_mut().insert(AuthenticatedUser {
        user_id: authorized.user_id,
        email: authorized.email,
        display_name: authorized.display_name,
    });

    next.run(req).await
}
