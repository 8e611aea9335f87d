//! Authorize Request Use Case
//!
//! Session validity first, then allow-list membership. Runs in front of
//! every protected route.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::application::verify_email::VerifyEmailUseCase;
use crate::domain::repository::{AllowListRepository, AuthSessionRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Caller that passed both checks
#[derive(Debug, Clone)]
pub struct AuthorizedSession {
    pub user_id: UserId,
    pub email: Email,
    pub display_name: Option<String>,
}

/// Authorize request use case
pub struct AuthorizeRequestUseCase<R>
where
    R: AuthSessionRepository + AllowListRepository + Send + Sync + 'static,
{
    check_session: CheckSessionUseCase<R>,
    verify_email: VerifyEmailUseCase<R>,
}

impl<R> AuthorizeRequestUseCase<R>
where
    R: AuthSessionRepository + AllowListRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self {
            check_session: CheckSessionUseCase::new(repo.clone(), config),
            verify_email: VerifyEmailUseCase::new(repo),
        }
    }

    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<AuthorizedSession> {
        let session = self.check_session.execute(session_token).await?;

        // A session email the allow-list could never contain is a denial.
        let email = Email::new(&session.email).map_err(|_| AuthError::NotAllowed)?;

        let decision = self.verify_email.check(&email).await?;
        if !decision.allowed {
            tracing::warn!(
                user_id = %session.user_id,
                email_domain = email.domain(),
                "Authenticated user is not on the allow-list"
            );
            return Err(AuthError::NotAllowed);
        }

        Ok(AuthorizedSession {
            user_id: session.user_id,
            email,
            display_name: decision.display_name,
        })
    }
}
