//! Send Message Use Case
//!
//! Persists the user's message, runs the assistant and persists its reply.
//!
//! ## Partial failures
//! - The user message is stored before the remote call, so it survives any
//!   assistant failure.
//! - Failing to store the reply after a completed run does not fail the
//!   request; the reply is reported as `None`.

use std::sync::Arc;

use kernel::id::{ConversationId, UserId};

use crate::application::config::ChatConfig;
use crate::application::create_thread::bind_thread;
use crate::application::orchestrator::AssistantOrchestrator;
use crate::domain::assistant::AssistantApi;
use crate::domain::entities::{Attachment, Message, NewMessage};
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::domain::value_objects::MessageText;
use crate::error::{ChatError, ChatResult};

/// Input for one exchange
#[derive(Debug, Clone)]
pub struct SendMessageInput {
    pub conversation_id: ConversationId,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// Result of one exchange
#[derive(Debug, Clone)]
pub struct SendMessageOutput {
    pub user_message: Message,
    pub assistant_message: Option<Message>,
}

/// Send message use case
pub struct SendMessageUseCase<R, A>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
    A: AssistantApi + Send + Sync + 'static,
{
    repo: Arc<R>,
    orchestrator: AssistantOrchestrator<A>,
    config: Arc<ChatConfig>,
}

impl<R, A> SendMessageUseCase<R, A>
where
    R: ConversationRepository + MessageRepository + Send + Sync + 'static,
    A: AssistantApi + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, assistant: Arc<A>, config: Arc<ChatConfig>) -> Self {
        Self {
            repo,
            orchestrator: AssistantOrchestrator::new(assistant, config.poll),
            config,
        }
    }

    pub async fn execute(&self, user_id: UserId, input: SendMessageInput) -> ChatResult<SendMessageOutput> {
        let text = MessageText::parse(&input.text, self.config.max_message_chars)?;
        validate_attachments(&input.attachments)?;

        let mut conversation = ConversationRepository::find_owned(
            self.repo.as_ref(),
            input.conversation_id,
            user_id,
        )
        .await?
        .ok_or(ChatError::ConversationNotFound)?;

        let ensured = self.orchestrator.ensure_thread(&conversation).await?;
        let thread_id = bind_thread(self.repo.as_ref(), &mut conversation, ensured).await?;

        let file_ids: Vec<String> = input.attachments.iter().map(|a| a.id.clone()).collect();

        let user_message = MessageRepository::insert(
            self.repo.as_ref(),
            &NewMessage::user(conversation.id, text.as_str().to_string(), input.attachments),
            user_id,
        )
        .await?
        .ok_or(ChatError::ConversationNotFound)?;

        let run_id = self
            .orchestrator
            .submit_message(&thread_id, text.as_str(), &file_ids)
            .await?;
        let outcome = self.orchestrator.await_completion(&thread_id, &run_id).await?;
        let reply = self.orchestrator.fetch_latest_reply(&thread_id).await?;

        tracing::info!(
            conversation_id = %conversation.id,
            run_id = %run_id,
            poll_attempts = outcome.attempts,
            "Assistant replied"
        );

        let assistant_message = match MessageRepository::insert(
            self.repo.as_ref(),
            &NewMessage::assistant(conversation.id, reply.text),
            user_id,
        )
        .await
        {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(
                    conversation_id = %conversation.id,
                    remote_message_id = %reply.remote_id,
                    error = %e,
                    "Failed to store assistant reply"
                );
                None
            }
        };

        if let Err(e) = self.repo.touch(conversation.id, user_id).await {
            tracing::warn!(
                conversation_id = %conversation.id,
                error = %e,
                "Failed to update conversation timestamp"
            );
        }

        Ok(SendMessageOutput {
            user_message,
            assistant_message,
        })
    }
}

fn validate_attachments(attachments: &[Attachment]) -> ChatResult<()> {
    if attachments.iter().any(|a| a.id.trim().is_empty()) {
        return Err(ChatError::InvalidInput(
            "Attachment file id is required".to_string(),
        ));
    }
    Ok(())
}
