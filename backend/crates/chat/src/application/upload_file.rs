//! Upload File Use Case
//!
//! Validates a file and forwards it to the assistant file API. Nothing is
//! stored locally; the returned attachment is echoed back by the client
//! when it sends the message that references it.

use std::sync::Arc;

use crate::application::config::ChatConfig;
use crate::domain::assistant::AssistantApi;
use crate::domain::entities::Attachment;
use crate::domain::value_objects::validate_upload;
use crate::error::ChatResult;

/// Uploaded file contents
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Upload file use case
pub struct UploadFileUseCase<A>
where
    A: AssistantApi + Send + Sync + 'static,
{
    assistant: Arc<A>,
    config: Arc<ChatConfig>,
}

impl<A> UploadFileUseCase<A>
where
    A: AssistantApi + Send + Sync + 'static,
{
    pub fn new(assistant: Arc<A>, config: Arc<ChatConfig>) -> Self {
        Self { assistant, config }
    }

    pub async fn execute(&self, input: UploadInput) -> ChatResult<Attachment> {
        let size = input.bytes.len() as u64;
        validate_upload(
            &input.file_name,
            &input.mime_type,
            size,
            self.config.max_upload_bytes,
        )?;

        let file_id = self
            .assistant
            .upload_file(&input.file_name, &input.mime_type, input.bytes)
            .await?;

        tracing::info!(file_id = %file_id, size = size, mime_type = %input.mime_type, "Uploaded file");

        Ok(Attachment {
            id: file_id,
            name: input.file_name,
            mime_type: input.mime_type,
            size,
        })
    }
}
