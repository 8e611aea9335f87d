//! Assistants API Client
//!
//! HTTP implementation of [`AssistantApi`] against the OpenAI Assistants v2
//! endpoints (threads, messages, runs, files).

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::application::config::AssistantConfig;
use crate::domain::assistant::{AssistantApi, RemoteMessage, RemoteServiceError};
use crate::domain::entities::MessageRole;
use crate::domain::value_objects::RunStatus;
use crate::error::{ChatError, ChatResult};

const ASSISTANTS_BETA: &str = "assistants=v2";

/// Page size when listing thread messages
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// Assistants API client
#[derive(Clone)]
pub struct OpenAiAssistant {
    http: reqwest::Client,
    config: AssistantConfig,
}

impl OpenAiAssistant {
    pub fn new(config: AssistantConfig) -> ChatResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|_| ChatError::Internal("Invalid assistant API key format".to_string()))?,
        );
        headers.insert(
            HeaderName::from_static("openai-beta"),
            HeaderValue::from_static(ASSISTANTS_BETA),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ChatError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteServiceError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteServiceError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteServiceError::Timeout
                } else {
                    RemoteServiceError::Decode(e.to_string())
                }
            })
    }
}

impl AssistantApi for OpenAiAssistant {
    async fn create_thread(&self) -> Result<String, RemoteServiceError> {
        let thread: IdResponse = self
            .send(self.http.post(self.config.endpoint("threads")).json(&json!({})))
            .await?;
        Ok(thread.id)
    }

    async fn create_message(
        &self,
        thread_id: &str,
        text: &str,
        file_ids: &[String],
    ) -> Result<(), RemoteServiceError> {
        let attachments: Vec<_> = file_ids
            .iter()
            .map(|file_id| {
                json!({
                    "file_id": file_id,
                    "tools": [{ "type": "file_search" }],
                })
            })
            .collect();

        let mut body = json!({
            "role": "user",
            "content": text,
        });
        if !attachments.is_empty() {
            body["attachments"] = json!(attachments);
        }

        let _: IdResponse = self
            .send(
                self.http
                    .post(self.config.endpoint(&format!("threads/{thread_id}/messages")))
                    .json(&body),
            )
            .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str) -> Result<String, RemoteServiceError> {
        let run: IdResponse = self
            .send(
                self.http
                    .post(self.config.endpoint(&format!("threads/{thread_id}/runs")))
                    .json(&json!({ "assistant_id": self.config.assistant_id })),
            )
            .await?;
        Ok(run.id)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, RemoteServiceError> {
        let run: RunResponse = self
            .send(
                self.http
                    .get(self.config.endpoint(&format!("threads/{thread_id}/runs/{run_id}"))),
            )
            .await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<RemoteMessage>, RemoteServiceError> {
        // Newest first so the latest reply is always on the first page.
        let list: MessageListResponse = self
            .send(
                self.http
                    .get(self.config.endpoint(&format!("threads/{thread_id}/messages")))
                    .query(&[
                        ("order", "desc".to_string()),
                        ("limit", MESSAGE_PAGE_LIMIT.to_string()),
                    ]),
            )
            .await?;

        let mut messages = list
            .data
            .into_iter()
            .map(MessageObject::into_remote)
            .collect::<Result<Vec<_>, _>>()?;
        messages.reverse();
        Ok(messages)
    }

    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, RemoteServiceError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| RemoteServiceError::Transport(e.to_string()))?;
        let form = Form::new().text("purpose", "assistants").part("file", part);

        let file: IdResponse = self
            .send(self.http.post(self.config.endpoint("files")).multipart(form))
            .await?;
        Ok(file.id)
    }
}

fn transport_error(e: reqwest::Error) -> RemoteServiceError {
    if e.is_timeout() {
        RemoteServiceError::Timeout
    } else {
        RemoteServiceError::Transport(e.to_string())
    }
}

/// `error.message` from a provider error body, or the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Deserialize)]
struct RunResponse {
    status: RunStatus,
}

#[derive(Deserialize)]
struct MessageListResponse {
    data: Vec<MessageObject>,
}

#[derive(Deserialize)]
struct MessageObject {
    id: String,
    role: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl MessageObject {
    fn into_remote(self) -> Result<RemoteMessage, RemoteServiceError> {
        let role = self.role.parse::<MessageRole>().map_err(RemoteServiceError::Decode)?;
        let text = self.content.into_iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.value),
            ContentBlock::Other => None,
        });

        Ok(RemoteMessage {
            id: self.id,
            role,
            text,
        })
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: TextValue },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct TextValue {
    value: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
