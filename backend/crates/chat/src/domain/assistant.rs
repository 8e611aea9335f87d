//! Assistant Service Port
//!
//! Operations the orchestrator needs from the hosted assistant API
//! (threads, messages, runs, files). The HTTP implementation lives in
//! `infra::openai`; tests use an in-memory fake.

use thiserror::Error;

use crate::domain::entities::MessageRole;
use crate::domain::value_objects::RunStatus;

/// Failure of a call to the remote assistant service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteServiceError {
    /// Non-success HTTP status
    #[error("assistant API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection failure before any status was received
    #[error("assistant API transport error: {0}")]
    Transport(String),

    /// The request exceeded the client timeout
    #[error("assistant API request timed out")]
    Timeout,

    /// Response body did not have the expected shape
    #[error("assistant API response could not be decoded: {0}")]
    Decode(String),
}

impl RemoteServiceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteServiceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Message as listed from a remote thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMessage {
    pub id: String,
    pub role: MessageRole,
    /// First text content block, if any
    pub text: Option<String>,
}

/// Remote assistant service
#[trait_variant::make(AssistantApi: Send)]
pub trait LocalAssistantApi {
    /// Create an empty thread; returns its id
    async fn create_thread(&self) -> Result<String, RemoteServiceError>;

    /// Append a user message; file ids are attached for file search
    async fn create_message(
        &self,
        thread_id: &str,
        text: &str,
        file_ids: &[String],
    ) -> Result<(), RemoteServiceError>;

    /// Start a run of the configured assistant; returns the run id
    async fn create_run(&self, thread_id: &str) -> Result<String, RemoteServiceError>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, RemoteServiceError>;

    /// Thread messages, oldest first
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<RemoteMessage>, RemoteServiceError>;

    /// Upload a file for assistant use; returns the file id
    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteServiceError>;
}
