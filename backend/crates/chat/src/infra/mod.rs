//! Infrastructure Layer
//!
//! Database, assistant API and export implementations.

pub mod openai;
pub mod pdf;
pub mod postgres;

pub use openai::OpenAiAssistant;
pub use pdf::PdfRenderer;
pub use postgres::PgChatRepository;
