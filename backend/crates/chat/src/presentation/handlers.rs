//! HTTP Handlers
//!
//! Every handler runs behind the session gate and a rate-limit layer; JSON
//! bodies are taken as `Result` so shape errors surface only after both.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use auth::AuthenticatedUser;
use kernel::id::ConversationId;
use std::sync::Arc;

use crate::application::config::ChatConfig;
use crate::application::{
    CreateThreadInput, CreateThreadUseCase, DeleteConversationUseCase,
    ExportConversationUseCase, ListConversationsUseCase, ListMessagesUseCase, SendMessageInput,
    SendMessageUseCase, UploadFileUseCase, UploadInput,
};
use crate::domain::assistant::AssistantApi;
use crate::domain::export::ExportRenderer;
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::error::{ChatError, ChatResult};
use crate::presentation::dto::{
    ConversationsResponse, CreateThreadRequest, CreateThreadResponse, DeleteConversationResponse,
    ExportRequest, MessagesQuery, MessagesResponse, SendMessageRequest, SendMessageResponse,
};

/// Multipart field names accepted for the uploaded file
const UPLOAD_FIELDS: [&str; 2] = ["file", "archivo"];

/// Shared state for chat handlers
#[derive(Clone)]
pub struct ChatAppState<R, A>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub assistant: Arc<A>,
    pub renderer: Arc<dyn ExportRenderer>,
    pub config: Arc<ChatConfig>,
}

impl<R, A> ChatAppState<R, A>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    pub fn new(
        repo: R,
        assistant: A,
        renderer: Arc<dyn ExportRenderer>,
        config: ChatConfig,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            assistant: Arc::new(assistant),
            renderer,
            config: Arc::new(config),
        }
    }
}

fn parse_conversation_id(raw: &str) -> ChatResult<ConversationId> {
    raw.trim()
        .parse()
        .map_err(|_| ChatError::InvalidInput("Invalid conversation id".to_string()))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ChatResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ChatError::InvalidInput(rejection.body_text()))
}

// ============================================================================
// Conversations
// ============================================================================

/// POST /api/chat/thread
pub async fn create_thread<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
    body: Result<Json<CreateThreadRequest>, JsonRejection>,
) -> ChatResult<Json<CreateThreadResponse>>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    // An empty request is fine: every field has a default.
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateThreadRequest::default(),
        Err(rejection) => return Err(ChatError::InvalidInput(rejection.body_text())),
    };

    let use_case = CreateThreadUseCase::new(
        state.repo.clone(),
        state.assistant.clone(),
        state.config.clone(),
    );

    let conversation = use_case
        .execute(
            user.user_id,
            CreateThreadInput {
                title: req.title,
                chat_type: req.chat_type,
            },
        )
        .await?;

    Ok(Json(CreateThreadResponse { conversation }))
}

/// GET /api/chat/conversations
pub async fn list_conversations<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
) -> ChatResult<Json<ConversationsResponse>>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let conversations = ListConversationsUseCase::new(state.repo.clone())
        .execute(user.user_id)
        .await?;

    Ok(Json(ConversationsResponse { conversations }))
}

/// DELETE /api/chat/conversation/{id}
pub async fn delete_conversation<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ChatResult<Json<DeleteConversationResponse>>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let conversation_id = parse_conversation_id(&id)?;

    DeleteConversationUseCase::new(state.repo.clone())
        .execute(user.user_id, conversation_id)
        .await?;

    Ok(Json(DeleteConversationResponse { success: true }))
}

// ============================================================================
// Messages
// ============================================================================

/// POST /api/chat
pub async fn send_message<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ChatResult<Json<SendMessageResponse>>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;
    let conversation_id = parse_conversation_id(&req.conversation_id)?;

    let use_case = SendMessageUseCase::new(
        state.repo.clone(),
        state.assistant.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(
            user.user_id,
            SendMessageInput {
                conversation_id,
                text: req.text,
                attachments: req.file_refs,
            },
        )
        .await?;

    Ok(Json(SendMessageResponse {
        user_message: output.user_message,
        assistant_message: output.assistant_message,
    }))
}

/// GET /api/chat/messages?conversationId=
pub async fn list_messages<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
    query: Result<Query<MessagesQuery>, QueryRejection>,
) -> ChatResult<Json<MessagesResponse>>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let Query(query) = query.map_err(|rejection| ChatError::InvalidInput(rejection.body_text()))?;
    let raw_id = query
        .conversation_id
        .ok_or_else(|| ChatError::InvalidInput("conversationId is required".to_string()))?;
    let conversation_id = parse_conversation_id(&raw_id)?;

    let messages = ListMessagesUseCase::new(state.repo.clone())
        .execute(user.user_id, conversation_id)
        .await?;

    Ok(Json(MessagesResponse { messages }))
}

// ============================================================================
// Upload
// ============================================================================

/// POST /api/upload
///
/// Multipart with the file in field `file` (or `archivo`).
pub async fn upload_file<R, A>(
    State(state): State<ChatAppState<R, A>>,
    _user: AuthenticatedUser,
    multipart: Result<Multipart, axum::extract::multipart::MultipartRejection>,
) -> ChatResult<Response>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let mut multipart =
        multipart.map_err(|rejection| ChatError::InvalidInput(rejection.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let is_file = field
            .name()
            .is_some_and(|name| UPLOAD_FIELDS.contains(&name));
        if !is_file {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| "archivo".to_string());
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;

        upload = Some(UploadInput {
            file_name,
            mime_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let input = upload.ok_or_else(|| ChatError::InvalidInput("No file provided".to_string()))?;

    let attachment = UploadFileUseCase::new(state.assistant.clone(), state.config.clone())
        .execute(input)
        .await?;

    Ok((StatusCode::OK, Json(attachment)).into_response())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ChatError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ChatError::PayloadTooLarge("File exceeds the upload size limit".to_string())
    } else {
        ChatError::InvalidInput(e.body_text())
    }
}

// ============================================================================
// Export
// ============================================================================

/// POST /api/chat/export
pub async fn export_conversation<R, A>(
    State(state): State<ChatAppState<R, A>>,
    user: AuthenticatedUser,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> ChatResult<Response>
where
    R: ConversationRepository + MessageRepository + Clone + Send + Sync + 'static,
    A: AssistantApi + Clone + Send + Sync + 'static,
{
    let req = json_body(body)?;
    let conversation_id = parse_conversation_id(&req.conversation_id)?;

    let document = ExportConversationUseCase::new(state.repo.clone(), state.renderer.clone())
        .execute(user.user_id, conversation_id)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        document.bytes,
    )
        .into_response())
}
