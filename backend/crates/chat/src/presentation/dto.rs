//! API DTOs (Data Transfer Objects)
//!
//! Request bodies accept the camelCase keys and the older Spanish ones.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Attachment, Conversation, Message};

// ============================================================================
// Conversations
// ============================================================================

/// Create thread request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateThreadRequest {
    #[serde(alias = "titulo")]
    pub title: Option<String>,
    #[serde(alias = "tipoChat", alias = "tipo_chat")]
    pub chat_type: Option<String>,
}

/// Create thread response
#[derive(Debug, Clone, Serialize)]
pub struct CreateThreadResponse {
    pub conversation: Conversation,
}

/// Conversation list response
#[derive(Debug, Clone, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteConversationResponse {
    pub success: bool,
}

// ============================================================================
// Messages
// ============================================================================

/// Send message request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(alias = "conversacionId")]
    pub conversation_id: String,
    #[serde(alias = "mensaje")]
    pub text: String,
    #[serde(default, alias = "archivos")]
    pub file_refs: Vec<Attachment>,
}

/// Send message response
///
/// `assistantMessage` is `null` when the reply could not be stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub user_message: Message,
    pub assistant_message: Option<Message>,
}

/// Query for `GET /chat/messages`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    #[serde(alias = "conversacionId")]
    pub conversation_id: Option<String>,
}

/// Message history response
#[derive(Debug, Clone, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

// ============================================================================
// Export
// ============================================================================

/// Export request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    #[serde(alias = "conversacionId")]
    pub conversation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_request_accepts_legacy_keys() {
        let req: SendMessageRequest = serde_json::from_value(serde_json::json!({
            "conversacionId": "c1",
            "mensaje": "hola",
            "archivos": [{"id": "file_1", "nombre": "a.pdf", "tipo": "application/pdf", "tamano": 10}],
        }))
        .unwrap();

        assert_eq!(req.conversation_id, "c1");
        assert_eq!(req.text, "hola");
        assert_eq!(req.file_refs.len(), 1);
        assert_eq!(req.file_refs[0].mime_type, "application/pdf");
    }

    #[test]
    fn test_send_message_request_file_refs_default_empty() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"conversationId":"c1","text":"hola"}"#).unwrap();
        assert!(req.file_refs.is_empty());
    }

    #[test]
    fn test_create_thread_request_all_optional() {
        let req: CreateThreadRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.chat_type.is_none());

        let legacy: CreateThreadRequest =
            serde_json::from_str(r#"{"titulo":"Turno noche","tipoChat":"general"}"#).unwrap();
        assert_eq!(legacy.title.as_deref(), Some("Turno noche"));
        assert_eq!(legacy.chat_type.as_deref(), Some("general"));
    }
}
