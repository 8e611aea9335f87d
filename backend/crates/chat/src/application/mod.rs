//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod config;
pub mod create_thread;
pub mod delete_conversation;
pub mod export_conversation;
pub mod list_messages;
pub mod orchestrator;
pub mod send_message;
pub mod upload_file;

// Re-exports
pub use config::{AssistantConfig, ChatConfig, PollConfig};
pub use create_thread::{CreateThreadInput, CreateThreadUseCase};
pub use delete_conversation::DeleteConversationUseCase;
pub use export_conversation::{ExportConversationUseCase, ExportedDocument};
pub use list_messages::{ListConversationsUseCase, ListMessagesUseCase};
pub use orchestrator::{AssistantOrchestrator, AssistantReply, EnsuredThread, PollOutcome};
pub use send_message::{SendMessageInput, SendMessageOutput, SendMessageUseCase};
pub use upload_file::{UploadFileUseCase, UploadInput};
