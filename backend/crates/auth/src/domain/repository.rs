//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{allowed_user::AllowedUser, auth_session::AuthSession};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;
use uuid::Uuid;

/// Allow-list repository trait
#[trait_variant::make(AllowListRepository: Send)]
pub trait LocalAllowListRepository {
    /// Find the allow-list entry for a normalized email (active or not)
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<AllowedUser>>;
}

/// Auth session repository trait (read-only)
#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    /// Find session by ID
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>>;
}
