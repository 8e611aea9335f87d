//! Verify Email Use Case
//!
//! Allow-list membership check, used both before login and on every
//! protected request.

use std::sync::Arc;

use crate::domain::entity::allowed_user::AccessDecision;
use crate::domain::repository::AllowListRepository;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Verify email use case
pub struct VerifyEmailUseCase<A>
where
    A: AllowListRepository + Send + Sync + 'static,
{
    allow_list: Arc<A>,
}

impl<A> VerifyEmailUseCase<A>
where
    A: AllowListRepository + Send + Sync + 'static,
{
    pub fn new(allow_list: Arc<A>) -> Self {
        Self { allow_list }
    }

    /// Validate the raw email, then look it up
    pub async fn execute(&self, raw_email: &str) -> AuthResult<AccessDecision> {
        let email = Email::new(raw_email)?;
        self.check(&email).await
    }

    /// Look up an already-normalized email
    pub async fn check(&self, email: &Email) -> AuthResult<AccessDecision> {
        let entry = self.allow_list.find_by_email(email).await?;
        let decision = AccessDecision::from_entry(entry.as_ref());

        tracing::debug!(
            email_domain = email.domain(),
            allowed = decision.allowed,
            "Allow-list lookup"
        );

        Ok(decision)
    }
}
