use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("session expired")]
    TokenExpired,

    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("invalid identity provider public key: {0}")]
    InvalidPublicKey(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}
