//! Authentication error types.

use mailfold_core::error::MailfoldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is required")]
    MissingAuthorization,

    #[error("invalid authorization header format")]
    MalformedAuthorization,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("invalid API key or client inactive")]
    UnknownApiKey,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for MailfoldError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Crypto(msg) => MailfoldError::Crypto(msg),
            other => MailfoldError::AuthenticationFailed {
                reason: other.to_string(),
            },
        }
    }
}
