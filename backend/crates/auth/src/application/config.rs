//! Application Configuration
//!
//! Configuration for the Auth application layer.

use base64::Engine;

use crate::error::{AuthError, AuthResult};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name (set by the identity provider)
    pub session_cookie_name: String,
    /// Shared secret for HMAC verification of session tokens (32 bytes)
    pub session_secret: [u8; 32],
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "auth_session".to_string(),
            session_secret: [0u8; 32],
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development
    ///
    /// Tokens signed by a real identity provider will not verify against the
    /// random secret; useful only with locally signed tokens.
    pub fn development() -> Self {
        Self::with_random_secret()
    }

    /// Decode a standard base64 secret that must be exactly 32 bytes
    pub fn decode_secret(encoded: &str) -> AuthResult<[u8; 32]> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuthError::Internal(format!("Session secret is not base64: {e}")))?;

        bytes.try_into().map_err(|bytes: Vec<u8>| {
            AuthError::Internal(format!(
                "Session secret must be 32 bytes, got {}",
                bytes.len()
            ))
        })
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.session_cookie_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.session_cookie_name, "auth_session");
    }

    #[test]
    fn test_with_random_secret() {
        let config1 = AuthConfig::with_random_secret();
        let config2 = AuthConfig::with_random_secret();

        assert_ne!(config1.session_secret, config2.session_secret);
        assert!(config1.session_secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_decode_secret() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        assert_eq!(AuthConfig::decode_secret(&encoded).unwrap(), [7u8; 32]);

        let short = base64::engine::general_purpose::STANDARD.encode([7u8; 16]);
        assert!(AuthConfig::decode_secret(&short).is_err());
        assert!(AuthConfig::decode_secret("not base64!").is_err());
    }
}
