//! Create Thread Use Case
//!
//! Creates a conversation and binds a remote thread to it.

use std::sync::Arc;

use kernel::id::{ConversationId, UserId};

use crate::application::config::ChatConfig;
use crate::application::orchestrator::{AssistantOrchestrator, EnsuredThread};
use crate::domain::assistant::AssistantApi;
use crate::domain::entities::{Conversation, NewConversation};
use crate::domain::repository::ConversationRepository;
use crate::domain::value_objects::{ChatType, ConversationTitle};
use crate::error::ChatResult;

/// Input for creating a conversation
#[derive(Debug, Clone, Default)]
pub struct CreateThreadInput {
    pub title: Option<String>,
    pub chat_type: Option<String>,
}

/// Create thread use case
pub struct CreateThreadUseCase<R, A>
where
    R: ConversationRepository + Send + Sync + 'static,
    A: AssistantApi + Send + Sync + 'static,
{
    repo: Arc<R>,
    orchestrator: AssistantOrchestrator<A>,
    config: Arc<ChatConfig>,
}

impl<R, A> CreateThreadUseCase<R, A>
where
    R: ConversationRepository + Send + Sync + 'static,
    A: AssistantApi + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, assistant: Arc<A>, config: Arc<ChatConfig>) -> Self {
        Self {
            repo,
            orchestrator: AssistantOrchestrator::new(assistant, config.poll),
            config,
        }
    }

    /// Insert the conversation, then create and bind its thread
    ///
    /// If the remote thread cannot be created the conversation is still
    /// returned with no thread; the first message creates one.
    pub async fn execute(&self, user_id: UserId, input: CreateThreadInput) -> ChatResult<Conversation> {
        let title = ConversationTitle::parse(
            input.title.as_deref(),
            &self.config.default_title,
            self.config.max_title_chars,
        )?;
        let chat_type = ChatType::parse(input.chat_type.as_deref(), &self.config.default_chat_type)?;

        let mut conversation = self
            .repo
            .create(&NewConversation {
                id: ConversationId::new(),
                user_id,
                title: title.into_inner(),
                chat_type: chat_type.into_inner(),
            })
            .await?;

        tracing::info!(
            conversation_id = %conversation.id,
            user_id = %user_id,
            "Created conversation"
        );

        match self.orchestrator.ensure_thread(&conversation).await {
            Ok(ensured) => {
                bind_thread(self.repo.as_ref(), &mut conversation, ensured).await?;
            }
            Err(e) => {
                tracing::warn!(
                    conversation_id = %conversation.id,
                    error = %e,
                    "Thread creation deferred to the first message"
                );
            }
        }

        Ok(conversation)
    }
}

/// Store a freshly created thread id through the compare-and-set
///
/// Updates `conversation.thread_id` to whichever id won. A losing thread is
/// abandoned on the remote side.
pub(crate) async fn bind_thread<R>(
    repo: &R,
    conversation: &mut Conversation,
    ensured: EnsuredThread,
) -> ChatResult<String>
where
    R: ConversationRepository + Send + Sync,
{
    if !ensured.created {
        return Ok(ensured.thread_id);
    }

    let stored = repo
        .assign_thread_if_absent(conversation.id, conversation.user_id, &ensured.thread_id)
        .await?;

    if stored != ensured.thread_id {
        tracing::info!(
            conversation_id = %conversation.id,
            abandoned_thread_id = %ensured.thread_id,
            thread_id = %stored,
            "Concurrent request bound a thread first"
        );
    }

    conversation.thread_id = Some(stored.clone());
    Ok(stored)
}
