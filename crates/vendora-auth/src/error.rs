//! Authentication error types.

use thiserror::Error;
use vendora_core::error::VendoraError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("malformed identity claims: {0}")]
    MalformedClaims(String),

    #[error("unknown user type: {0}")]
    UnknownUserType(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for VendoraError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) => VendoraError::Internal(msg),
            other => VendoraError::Unauthenticated {
                reason: other.to_string(),
            },
        }
    }
}
