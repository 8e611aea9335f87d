//! Export Renderer Port

use crate::domain::entities::{Conversation, Message};
use crate::error::ChatResult;

/// Renders a conversation into a downloadable document
pub trait ExportRenderer: Send + Sync {
    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;

    /// File extension without the dot
    fn extension(&self) -> &'static str;

    fn render(&self, conversation: &Conversation, messages: &[Message]) -> ChatResult<Vec<u8>>;
}
