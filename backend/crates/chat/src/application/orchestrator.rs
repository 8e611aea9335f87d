//! Assistant Orchestrator
//!
//! One exchange with the remote assistant, as four strictly sequential
//! steps: ensure a thread, submit the message and start a run, poll the run
//! to completion, fetch the reply.

use std::sync::Arc;

use crate::application::config::PollConfig;
use crate::domain::assistant::AssistantApi;
use crate::domain::entities::{Conversation, MessageRole};
use crate::domain::polling::{PollObservation, PollState, next_poll_state};
use crate::domain::value_objects::RunStatus;
use crate::error::{ChatError, ChatResult};

/// Thread id for a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredThread {
    pub thread_id: String,
    /// True when a remote thread was created by this call
    pub created: bool,
}

/// Successful poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    /// Status checks performed
    pub attempts: u32,
}

/// Assistant text reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub remote_id: String,
    pub text: String,
}

pub struct AssistantOrchestrator<A>
where
    A: AssistantApi + Send + Sync + 'static,
{
    assistant: Arc<A>,
    poll: PollConfig,
}

impl<A> AssistantOrchestrator<A>
where
    A: AssistantApi + Send + Sync + 'static,
{
    pub fn new(assistant: Arc<A>, poll: PollConfig) -> Self {
        Self { assistant, poll }
    }

    /// Reuse the cached thread id, or create a remote thread
    ///
    /// Does not persist anything; the caller stores a created id through
    /// the repository's compare-and-set.
    pub async fn ensure_thread(&self, conversation: &Conversation) -> ChatResult<EnsuredThread> {
        if let Some(thread_id) = &conversation.thread_id {
            return Ok(EnsuredThread {
                thread_id: thread_id.clone(),
                created: false,
            });
        }

        let thread_id = self.assistant.create_thread().await?;
        tracing::info!(
            conversation_id = %conversation.id,
            thread_id = %thread_id,
            "Created assistant thread"
        );

        Ok(EnsuredThread {
            thread_id,
            created: true,
        })
    }

    /// Post the user message and start a run; returns the run id
    pub async fn submit_message(
        &self,
        thread_id: &str,
        text: &str,
        file_ids: &[String],
    ) -> ChatResult<String> {
        self.assistant
            .create_message(thread_id, text, file_ids)
            .await?;

        let run_id = self.assistant.create_run(thread_id).await?;
        tracing::debug!(
            thread_id = %thread_id,
            run_id = %run_id,
            files = file_ids.len(),
            "Started assistant run"
        );

        Ok(run_id)
    }

    /// Wait for the run to finish
    ///
    /// Sleeps one interval before every status check, up to the attempt
    /// budget. A failed status check consumes an attempt without aborting.
    pub async fn await_completion(&self, thread_id: &str, run_id: &str) -> ChatResult<PollOutcome> {
        let max_attempts = self.poll.max_attempts;
        let mut state = PollState::Queued;
        let mut last_status = RunStatus::Queued;
        let mut attempts = 0;

        while attempts < max_attempts {
            tokio::time::sleep(self.poll.interval).await;
            attempts += 1;

            let observation = match self.assistant.get_run(thread_id, run_id).await {
                Ok(status) => {
                    last_status = status;
                    PollObservation::Status(status)
                }
                Err(e) => {
                    tracing::warn!(
                        run_id = %run_id,
                        attempt = attempts,
                        error = %e,
                        "Run status check failed"
                    );
                    PollObservation::TransientError
                }
            };

            state = next_poll_state(state, observation, attempts, max_attempts);

            match state {
                PollState::Completed => {
                    tracing::debug!(run_id = %run_id, attempts = attempts, "Assistant run completed");
                    return Ok(PollOutcome { attempts });
                }
                PollState::Failed => {
                    return Err(ChatError::RunFailed {
                        run_id: run_id.to_string(),
                        status: last_status,
                    });
                }
                PollState::Cancelled => {
                    return Err(ChatError::RunCancelled {
                        run_id: run_id.to_string(),
                    });
                }
                PollState::TimedOut => break,
                PollState::Queued | PollState::InProgress => {}
            }
        }

        Err(ChatError::RunTimeout {
            run_id: run_id.to_string(),
            attempts,
        })
    }

    /// Latest thread message, which must be an assistant text reply
    pub async fn fetch_latest_reply(&self, thread_id: &str) -> ChatResult<AssistantReply> {
        let messages = self.assistant.list_messages(thread_id).await?;

        let latest = messages.into_iter().last().ok_or(ChatError::NoReply)?;
        if latest.role != MessageRole::Assistant {
            return Err(ChatError::NoReply);
        }

        match latest.text {
            Some(text) if !text.trim().is_empty() => Ok(AssistantReply {
                remote_id: latest.id,
                text,
            }),
            _ => Err(ChatError::NoReply),
        }
    }
}
