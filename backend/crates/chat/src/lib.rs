//! Chat Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, polling state machine, ports
//! - `application/` - Use cases and the assistant orchestrator
//! - `infra/` - PostgreSQL, Assistants API client, PDF renderer
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Request model
//! - Conversations and messages are always read and written together with
//!   the owning user id; a conversation owned by someone else is not found
//! - A conversation is bound to at most one remote thread, assigned through
//!   a compare-and-set so concurrent first messages converge on one id
//! - A run is polled at a fixed interval for a bounded number of checks
//! - The user's message is persisted before the remote call and survives
//!   any assistant failure

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AssistantConfig, ChatConfig, PollConfig};
pub use error::{ChatError, ChatResult};
pub use infra::{OpenAiAssistant, PdfRenderer, PgChatRepository};
pub use presentation::handlers::ChatAppState;
pub use presentation::router::chat_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
