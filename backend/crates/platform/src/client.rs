//! Client identification utilities
//!
//! Common functions for identifying clients via HTTP headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Authenticated subject stored in request extensions
///
/// Inserted by the auth layer once the session and allow-list checks pass,
/// so that infrastructure below it (rate limiting) can key on the user
/// instead of the client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject(pub String);

/// First entry of the X-Forwarded-For header, as sent by the proxy
///
/// The value is trimmed but not parsed; proxies sometimes forward
/// host names or obfuscated identifiers.
pub fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = xff.split(',').next()?.trim();

    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}

/// Build the rate-limit identifier for a request
///
/// * `user:<id>` when a session is present
/// * `ip:<first forwarded address>` otherwise, falling back to the direct
///   connection address and finally to `ip:unknown`
pub fn rate_limit_identifier(
    user_id: Option<&str>,
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
) -> String {
    if let Some(user_id) = user_id {
        return format!("user:{user_id}");
    }

    let address = forwarded_for(headers)
        .or_else(|| direct_ip.map(|ip| ip.to_string()))
        .unwrap_or_else(|| "unknown".to_string());

    format!("ip:{address}")
}
