use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;

use crate::error::AuthError;

/// Claims read from an identity-provider session token.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionClaims {
    /// The user id.
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub iat: Option<u64>,
    #[serde(default)]
    pub iss: Option<String>,
    /// Session id.
    #[serde(default)]
    pub sid: Option<String>,
}

/// Validate a session token against the identity provider's RS256 public
/// key (PEM). Checks the signature and expiry.
pub fn verify_session(token: &str, public_key_pem: &str) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| AuthError::InvalidPublicKey(e.to_string()))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::Jwt(e),
        }
    })?;

    if token_data.claims.sub.is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }

    Ok(token_data.claims)
}

/// Read the claims of a session token without checking its signature.
///
/// Only used when no public key is configured. Expiry is still enforced.
pub fn read_session_unverified(token: &str) -> Result<SessionClaims, AuthError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::InvalidToken("expected three segments".to_string()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::InvalidToken(format!("payload is not base64url: {e}")))?;
    let claims: SessionClaims = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::InvalidToken(format!("payload is not valid claims: {e}")))?;

    let now = jiff::Timestamp::now().as_second();
    if (claims.exp as i64) < now {
        return Err(AuthError::TokenExpired);
    }
    if claims.sub.is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }

    Ok(claims)
}
