//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod check_session;
pub mod config;
pub mod session_token;
pub mod verify_email;

// Re-exports
pub use authorize::{AuthorizeRequestUseCase, AuthorizedSession};
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use verify_email::VerifyEmailUseCase;
