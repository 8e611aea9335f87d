//! Export Conversation Use Case

use std::sync::Arc;

use kernel::id::{ConversationId, UserId};

use crate::domain::entities::Conversation;
use crate::domain::export::ExportRenderer;
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::error::{ChatError, ChatResult};

/// Rendered export
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Export conversation use case
pub struct ExportConversationUseCase<R>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
    renderer: Arc<dyn ExportRenderer>,
}

impl<R> ExportConversationUseCase<R>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, renderer: Arc<dyn ExportRenderer>) -> Self {
        Self { repo, renderer }
    }

    pub async fn execute(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
    ) -> ChatResult<ExportedDocument> {
        let conversation: Conversation =
            ConversationRepository::find_owned(self.repo.as_ref(), conversation_id, user_id)
                .await?
                .ok_or(ChatError::ConversationNotFound)?;

        let messages =
            MessageRepository::list_owned(self.repo.as_ref(), conversation.id, user_id).await?;

        // Rendering is CPU-bound; keep it off the async workers.
        let renderer = self.renderer.clone();
        let conversation_for_render = conversation.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            renderer.render(&conversation_for_render, &messages)
        })
        .await
        .map_err(|e| ChatError::Internal(format!("Export task failed: {e}")))??;

        tracing::info!(
            conversation_id = %conversation.id,
            bytes = bytes.len(),
            "Exported conversation"
        );

        Ok(ExportedDocument {
            file_name: format!("conversacion-{}.{}", conversation.id, self.renderer.extension()),
            content_type: self.renderer.content_type(),
            bytes,
        })
    }
}
