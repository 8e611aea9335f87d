//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{allowed_user::AllowedUser, auth_session::AuthSession};
use crate::domain::repository::{AllowListRepository, AuthSessionRepository};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Allow-list Repository Implementation
// ============================================================================

impl AllowListRepository for PgAuthRepository {
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<AllowedUser>> {
        let row = sqlx::query_as::<_, AllowedUserRow>(
            r#"
            SELECT
                id,
                email,
                nombre,
                activo,
                creado_en,
                actualizado_en
            FROM usuarios_permitidos
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AllowedUserRow::into_allowed_user))
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                email,
                expires_at_ms
            FROM auth_sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthSessionRow::into_session))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AllowedUserRow {
    id: Uuid,
    email: String,
    nombre: Option<String>,
    activo: bool,
    creado_en: DateTime<Utc>,
    actualizado_en: DateTime<Utc>,
}

impl AllowedUserRow {
    fn into_allowed_user(self) -> AllowedUser {
        AllowedUser {
            id: self.id,
            email: Email::from_db(self.email),
            display_name: self.nombre.filter(|name| !name.trim().is_empty()),
            active: self.activo,
            created_at: self.creado_en,
            updated_at: self.actualizado_en,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    email: String,
    expires_at_ms: i64,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthSession {
        AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            email: self.email,
            expires_at_ms: self.expires_at_ms,
        }
    }
}
