//! Error types for the Mailfold system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailfoldError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity} with {key}")]
    AlreadyExists { entity: String, key: String },

    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MailfoldError {
    /// HTTP-style status code for the outward-facing response layer.
    ///
    /// A storage outage maps to 503, never to 401 — an unreachable
    /// registry must not be reported as invalid credentials.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::AlreadyExists { .. } => 409,
            Self::AuthenticationFailed { .. } => 401,
            Self::Forbidden { .. } => 403,
            Self::Validation { .. } => 400,
            Self::StorageUnavailable(_) => 503,
            Self::Database(_) | Self::Crypto(_) | Self::Internal(_) => 500,
        }
    }
}

pub type MailfoldResult<T> = Result<T, MailfoldError>;
