//! Auth Session Entity
//!
//! Session row written by the identity provider and only read here.

use kernel::id::UserId;
use uuid::Uuid;

/// Auth session entity
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID, the first half of the cookie token
    pub session_id: Uuid,
    /// Owner of every conversation touched with this session
    pub user_id: UserId,
    /// Email as recorded by the identity provider (not yet normalized)
    pub email: String,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl AuthSession {
    /// Expired once `now` reaches `expires_at_ms`
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp_millis())
    }
}
