//! Domain Entities

pub mod allowed_user;
pub mod auth_session;
