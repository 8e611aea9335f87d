//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client identification (forwarded IP, rate-limit identifiers)
//! - Cookie extraction
//! - In-memory fixed-window rate limiting and its axum middleware

pub mod client;
pub mod cookie;
pub mod rate_limit;
