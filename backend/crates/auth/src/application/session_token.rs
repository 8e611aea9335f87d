//! Session Token Format
//!
//! `<session uuid>.<base64url-nopad(HMAC-SHA256(secret, session uuid))>`

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &[u8], session_id: &str) -> AuthResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AuthError::Internal(format!("Invalid HMAC key: {e}")))?;
    mac.update(session_id.as_bytes());
    Ok(mac)
}

/// Sign a session id the way the identity provider does
pub fn sign_session_token(secret: &[u8], session_id: Uuid) -> AuthResult<String> {
    let id = session_id.to_string();
    let signature = mac_for(secret, &id)?.finalize().into_bytes();
    Ok(format!("{id}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify the signature and return the session id
pub fn verify_session_token(secret: &[u8], token: &str) -> AuthResult<Uuid> {
    let (session_id, signature_b64) = token.split_once('.').ok_or(AuthError::SessionInvalid)?;

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AuthError::SessionInvalid)?;

    mac_for(secret, session_id)?
        .verify_slice(&signature)
        .map_err(|_| AuthError::SessionInvalid)?;

    session_id.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: [u8; 32] = [42u8; 32];

    #[test]
    fn test_signed_token_verifies() {
        let session_id = Uuid::new_v4();
        let token = sign_session_token(&SECRET, session_id).unwrap();

        assert!(token.starts_with(&session_id.to_string()));
        assert_eq!(verify_session_token(&SECRET, &token).unwrap(), session_id);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign_session_token(&SECRET, Uuid::new_v4()).unwrap();
        assert!(matches!(
            verify_session_token(&[43u8; 32], &token),
            Err(AuthError::SessionInvalid)
        ));
    }

    #[test]
    fn test_tampered_session_id_is_rejected() {
        let token = sign_session_token(&SECRET, Uuid::new_v4()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!("{}.{signature}", Uuid::new_v4());

        assert!(verify_session_token(&SECRET, &forged).is_err());
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        for token in ["", "no-dot", "abc.!!!", "not-a-uuid.AAAA"] {
            assert!(
                matches!(
                    verify_session_token(&SECRET, token),
                    Err(AuthError::SessionInvalid)
                ),
                "token {token:?} should be rejected"
            );
        }
    }
}
