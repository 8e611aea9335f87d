//! Auth (Access Gate) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Validation of the identity provider's signed session cookie
//! - Allow-list membership check (`usuarios_permitidos`)
//! - Pre-login email verification endpoint
//!
//! ## Security Model
//! - Sessions are issued by the identity provider; this crate only reads them
//! - Session tokens are `<uuid>.<base64url(HMAC-SHA256)>` and verified in
//!   constant time before any database lookup
//! - Every protected route passes session validity, then allow-list
//!   membership, before anything else runs

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::middleware::{AuthMiddlewareState, AuthenticatedUser, require_allowed_session};
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
