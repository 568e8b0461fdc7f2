//! Database-specific error types and conversions.

use bk_core::error::BkError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed stored value: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write.
    #[error("{0}")]
    Duplicate(String),
}

impl From<DbError> for BkError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => BkError::NotFound { entity, id },
            DbError::Duplicate(reason) => BkError::Conflict { reason },
            other => BkError::Database(other.to_string()),
        }
    }
}
