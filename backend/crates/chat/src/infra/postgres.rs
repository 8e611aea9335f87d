//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{ConversationId, MessageId, UserId};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entities::{
    Attachment, Conversation, Message, MessageRole, NewConversation, NewMessage,
};
use crate::domain::repository::{ConversationRepository, MessageRepository};
use crate::error::{ChatError, ChatResult};

/// PostgreSQL-backed conversation and message repository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Conversation Repository Implementation
// ============================================================================

impl ConversationRepository for PgChatRepository {
    async fn create(&self, conversation: &NewConversation) -> ChatResult<Conversation> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            INSERT INTO conversaciones (id, usuario_id, titulo, tipo_chat)
            VALUES ($1, $2, $3, $4)
            RETURNING id, usuario_id, titulo, tipo_chat, thread_id, creado_en, actualizado_en
            "#,
        )
        .bind(conversation.id.into_uuid())
        .bind(conversation.user_id.into_uuid())
        .bind(&conversation.title)
        .bind(&conversation.chat_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_conversation())
    }

    async fn find_owned(
        &self,
        id: ConversationId,
        user_id: UserId,
    ) -> ChatResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, usuario_id, titulo, tipo_chat, thread_id, creado_en, actualizado_en
            FROM conversaciones
            WHERE id = $1 AND usuario_id = $2
            "#,
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ConversationRow::into_conversation))
    }

    async fn list_owned(&self, user_id: UserId) -> ChatResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(
            r#"
            SELECT id, usuario_id, titulo, tipo_chat, thread_id, creado_en, actualizado_en
            FROM conversaciones
            WHERE usuario_id = $1
            ORDER BY actualizado_en DESC
            "#,
        )
        .bind(user_id.into_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ConversationRow::into_conversation).collect())
    }

    async fn assign_thread_if_absent(
        &self,
        id: ConversationId,
        user_id: UserId,
        thread_id: &str,
    ) -> ChatResult<String> {
        let assigned: Option<String> = sqlx::query_scalar(
            r#"
            UPDATE conversaciones
            SET thread_id = $3, actualizado_en = NOW()
            WHERE id = $1 AND usuario_id = $2 AND thread_id IS NULL
            RETURNING thread_id
            "#,
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .bind(thread_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(assigned) = assigned {
            return Ok(assigned);
        }

        // Lost the race (or the row is gone): read whatever is stored.
        let stored: Option<Option<String>> = sqlx::query_scalar(
            r#"
            SELECT thread_id
            FROM conversaciones
            WHERE id = $1 AND usuario_id = $2
            "#,
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match stored {
            Some(Some(existing)) => Ok(existing),
            Some(None) => Err(ChatError::Internal(
                "Thread assignment did not take effect".to_string(),
            )),
            None => Err(ChatError::ConversationNotFound),
        }
    }

    async fn touch(&self, id: ConversationId, user_id: UserId) -> ChatResult<()> {
        sqlx::query(
            r#"
            UPDATE conversaciones
            SET actualizado_en = NOW()
            WHERE id = $1 AND usuario_id = $2
            "#,
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_owned(&self, id: ConversationId, user_id: UserId) -> ChatResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM conversaciones
            WHERE id = $1 AND usuario_id = $2
            "#,
        )
        .bind(id.into_uuid())
        .bind(user_id.into_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

// ============================================================================
// Message Repository Implementation
// ============================================================================

impl MessageRepository for PgChatRepository {
    async fn insert(&self, message: &NewMessage, user_id: UserId) -> ChatResult<Option<Message>> {
        // Ownership is part of the insert: no row is written into a
        // conversation the caller does not own.
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO mensajes (id, conversacion_id, rol, contenido, archivos_adjuntos)
            SELECT $1, c.id, $3, $4, $5
            FROM conversaciones c
            WHERE c.id = $2 AND c.usuario_id = $6
            RETURNING id, conversacion_id, rol, contenido, archivos_adjuntos, creado_en
            "#,
        )
        .bind(message.id.into_uuid())
        .bind(message.conversation_id.into_uuid())
        .bind(message.role.as_str())
        .bind(&message.content)
        .bind(Json(&message.attachments))
        .bind(user_id.into_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MessageRow::into_message).transpose()
    }

    async fn list_owned(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ChatResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.id, m.conversacion_id, m.rol, m.contenido, m.archivos_adjuntos, m.creado_en
            FROM mensajes m
            JOIN conversaciones c ON c.id = m.conversacion_id
            WHERE m.conversacion_id = $1 AND c.usuario_id = $2
            ORDER BY m.creado_en ASC, m.id ASC
            "#,
        )
        .bind(conversation_id.into_uuid())
        .bind(user_id.into_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MessageRow::into_message).collect()
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: Uuid,
    usuario_id: Uuid,
    titulo: String,
    tipo_chat: String,
    thread_id: Option<String>,
    creado_en: DateTime<Utc>,
    actualizado_en: DateTime<Utc>,
}

impl ConversationRow {
    fn into_conversation(self) -> Conversation {
        Conversation {
            id: ConversationId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.usuario_id),
            title: self.titulo,
            chat_type: self.tipo_chat,
            thread_id: self.thread_id.filter(|t| !t.is_empty()),
            created_at: self.creado_en,
            updated_at: self.actualizado_en,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    conversacion_id: Uuid,
    rol: String,
    contenido: String,
    archivos_adjuntos: Option<Json<Vec<Attachment>>>,
    creado_en: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> ChatResult<Message> {
        let role: MessageRole = self
            .rol
            .parse()
            .map_err(|_| ChatError::Internal(format!("Unknown message role: {}", self.rol)))?;

        Ok(Message {
            id: MessageId::from_uuid(self.id),
            conversation_id: ConversationId::from_uuid(self.conversacion_id),
            role,
            content: self.contenido,
            attachments: self.archivos_adjuntos.map(|Json(a)| a).unwrap_or_default(),
            created_at: self.creado_en,
        })
    }
}
