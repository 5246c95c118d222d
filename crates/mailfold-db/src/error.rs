//! Database-specific error types and conversions.

use mailfold_core::error::MailfoldError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Connection failed: {0}")]
    Unavailable(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity} with {key}")]
    Conflict { entity: String, key: String },
}

impl From<DbError> for MailfoldError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MailfoldError::NotFound { entity, id },
            DbError::Conflict { entity, key } => MailfoldError::AlreadyExists { entity, key },
            DbError::Unavailable(msg) => MailfoldError::StorageUnavailable(msg),
            other => MailfoldError::Database(other.to_string()),
        }
    }
}
