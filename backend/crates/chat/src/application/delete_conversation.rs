//! Delete Conversation Use Case

use std::sync::Arc;

use kernel::id::{ConversationId, UserId};

use crate::domain::repository::ConversationRepository;
use crate::error::{ChatError, ChatResult};

/// Delete conversation use case
///
/// Messages go with it (`ON DELETE CASCADE`). The remote thread is left
/// alone; the provider expires idle threads.
pub struct DeleteConversationUseCase<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> DeleteConversationUseCase<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: UserId, conversation_id: ConversationId) -> ChatResult<()> {
        if !self.repo.delete_owned(conversation_id, user_id).await? {
            return Err(ChatError::ConversationNotFound);
        }

        tracing::info!(
            conversation_id = %conversation_id,
            user_id = %user_id,
            "Deleted conversation"
        );
        Ok(())
    }
}
