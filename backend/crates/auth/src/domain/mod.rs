//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{allowed_user::AllowedUser, auth_session::AuthSession};
pub use repository::{AllowListRepository, AuthSessionRepository};
