//! Domain Entities
//!
//! Records serialize with their column names (`titulo`, `rol`, ...), which is
//! what the frontend consumes.

use chrono::{DateTime, Utc};
use kernel::id::{ConversationId, MessageId, UserId};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Header label used in exports
    pub const fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "Usuario",
            MessageRole::Assistant => "Asistente",
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("unknown message role: {other}")),
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File attached to a message; `id` is the remote file id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "tipo")]
    pub mime_type: String,
    #[serde(alias = "tamano")]
    pub size: u64,
}

/// Conversation (`conversaciones`)
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(rename = "usuario_id")]
    pub user_id: UserId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "tipo_chat")]
    pub chat_type: String,
    /// Remote thread; assigned at most once
    pub thread_id: Option<String>,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "actualizado_en")]
    pub updated_at: DateTime<Utc>,
}

/// Message (`mensajes`)
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(rename = "conversacion_id")]
    pub conversation_id: ConversationId,
    #[serde(rename = "rol")]
    pub role: MessageRole,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "archivos_adjuntos")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "creado_en")]
    pub created_at: DateTime<Utc>,
}

/// Conversation to insert
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub id: ConversationId,
    pub user_id: UserId,
    pub title: String,
    pub chat_type: String,
}

/// Message to insert
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub role: MessageRole,
    pub content: String,
    pub attachments: Vec<Attachment>,
}

impl NewMessage {
    pub fn user(conversation_id: ConversationId, content: String, attachments: Vec<Attachment>) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: MessageRole::User,
            content,
            attachments,
        }
    }

    pub fn assistant(conversation_id: ConversationId, content: String) -> Self {
        Self {
            id: MessageId::new(),
            conversation_id,
            role: MessageRole::Assistant,
            content,
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serializes_with_column_names() {
        let message = Message {
            id: MessageId::new(),
            conversation_id: ConversationId::new(),
            role: MessageRole::User,
            content: "hola".into(),
            attachments: vec![Attachment {
                id: "file-1".into(),
                name: "norma.pdf".into(),
                mime_type: "application/pdf".into(),
                size: 1024,
            }],
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["rol"], "user");
        assert_eq!(json["contenido"], "hola");
        assert_eq!(json["archivos_adjuntos"][0]["mimeType"], "application/pdf");
        assert!(json.get("conversacion_id").is_some());
        assert!(json.get("creado_en").is_some());
    }

    #[test]
    fn test_attachment_accepts_legacy_keys() {
        let attachment: Attachment = serde_json::from_str(
            r#"{"id":"file-9","nombre":"plan.docx","tipo":"application/msword","tamano":42}"#,
        )
        .unwrap();

        assert_eq!(attachment.name, "plan.docx");
        assert_eq!(attachment.mime_type, "application/msword");
        assert_eq!(attachment.size, 42);
    }

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("assistant".parse::<MessageRole>().unwrap(), MessageRole::Assistant);
        assert!("system".parse::<MessageRole>().is_err());
        assert_eq!(MessageRole::User.label(), "Usuario");
    }
}
