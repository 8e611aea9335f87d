//! Check Session Use Case
//!
//! Verifies the session token and loads the session row.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token::verify_session_token;
use crate::domain::entity::auth_session::AuthSession;
use crate::domain::repository::AuthSessionRepository;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve a cookie token to a live session
    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<AuthSession> {
        let token = session_token.ok_or(AuthError::SessionMissing)?;
        let session_id = verify_session_token(&self.config.session_secret, token)?;

        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            tracing::debug!(session_id = %session_id, "Session expired");
            return Err(AuthError::SessionExpired);
        }

        Ok(session)
    }
}
