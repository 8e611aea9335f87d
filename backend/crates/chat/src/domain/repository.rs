//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//!
//! Every operation takes the owning user: ownership is enforced in the
//! query, never by comparing afterwards.

use kernel::id::{ConversationId, UserId};

use crate::domain::entities::{Conversation, Message, NewConversation, NewMessage};
use crate::error::ChatResult;

/// Conversation repository trait
#[trait_variant::make(ConversationRepository: Send)]
pub trait LocalConversationRepository {
    /// Insert a conversation without a thread
    async fn create(&self, conversation: &NewConversation) -> ChatResult<Conversation>;

    /// Find a conversation owned by `user_id`
    async fn find_owned(
        &self,
        id: ConversationId,
        user_id: UserId,
    ) -> ChatResult<Option<Conversation>>;

    /// All conversations of a user, most recently updated first
    async fn list_owned(&self, user_id: UserId) -> ChatResult<Vec<Conversation>>;

    /// Set `thread_id` only if it is still null; returns the id that ended
    /// up stored (ours, or the one a concurrent request stored first)
    async fn assign_thread_if_absent(
        &self,
        id: ConversationId,
        user_id: UserId,
        thread_id: &str,
    ) -> ChatResult<String>;

    /// Bump `actualizado_en`
    async fn touch(&self, id: ConversationId, user_id: UserId) -> ChatResult<()>;

    /// Delete a conversation and its messages; false if not owned
    async fn delete_owned(&self, id: ConversationId, user_id: UserId) -> ChatResult<bool>;
}

/// Message repository trait
#[trait_variant::make(MessageRepository: Send)]
pub trait LocalMessageRepository {
    /// Insert into a conversation owned by `user_id`; None if not owned
    async fn insert(&self, message: &NewMessage, user_id: UserId) -> ChatResult<Option<Message>>;

    /// Messages of an owned conversation, oldest first
    async fn list_owned(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ChatResult<Vec<Message>>;
}
