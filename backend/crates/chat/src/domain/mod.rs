//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Conversation, Message, Attachment)
//! - Domain value objects (titles, message text, upload rules, run status)
//! - The run polling state machine
//! - Ports: repository traits, the assistant service, the export renderer

pub mod assistant;
pub mod entities;
pub mod export;
pub mod polling;
pub mod repository;
pub mod value_objects;
