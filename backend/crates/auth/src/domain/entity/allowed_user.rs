//! Allowed User Entity
//!
//! Row of the allow-list (`usuarios_permitidos`). Maintained by hand by the
//! operators; this service never writes it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::email::Email;

/// Allow-list entry
#[derive(Debug, Clone)]
pub struct AllowedUser {
    pub id: Uuid,
    pub email: Email,
    /// Display name shown in the UI (`nombre`)
    pub display_name: Option<String>,
    /// Inactive entries are kept for audit but grant nothing
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllowedUser {
    pub fn grants_access(&self) -> bool {
        self.active
    }
}

/// Result of an allow-list lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub display_name: Option<String>,
}

impl AccessDecision {
    pub fn denied() -> Self {
        Self {
            allowed: false,
            display_name: None,
        }
    }

    /// Absent or inactive rows deny
    pub fn from_entry(entry: Option<&AllowedUser>) -> Self {
        match entry {
            Some(user) if user.grants_access() => Self {
                allowed: true,
                display_name: user.display_name.clone(),
            },
            _ => Self::denied(),
        }
    }
}
