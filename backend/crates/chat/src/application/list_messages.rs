//! Read Use Cases
//!
//! Conversation history and the conversation list.

use std::sync::Arc;

use kernel::id::{ConversationId, UserId};

use crate::domain::entities::{Conversation, Message};
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::error::{ChatError, ChatResult};

/// List messages use case
pub struct ListMessagesUseCase<R>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> ListMessagesUseCase<R>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Messages oldest first; not found when the conversation is not owned
    pub async fn execute(
        &self,
        user_id: UserId,
        conversation_id: ConversationId,
    ) -> ChatResult<Vec<Message>> {
        let conversation =
            ConversationRepository::find_owned(self.repo.as_ref(), conversation_id, user_id)
                .await?
                .ok_or(ChatError::ConversationNotFound)?;

        MessageRepository::list_owned(self.repo.as_ref(), conversation.id, user_id).await
    }
}

/// List conversations use case
pub struct ListConversationsUseCase<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    repo: Arc<R>,
}

impl<R> ListConversationsUseCase<R>
where
    R: ConversationRepository + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, user_id: UserId) -> ChatResult<Vec<Conversation>> {
        ConversationRepository::list_owned(self.repo.as_ref(), user_id).await
    }
}
