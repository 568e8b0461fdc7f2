//! Error types for the BK case-management core.

use thiserror::Error;

/// Coarse classification of a [`BkError`], used by the boundary layer to
/// pick a status code or user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingField,
    DomainRule,
    NotFound,
    Tenancy,
    Conflict,
    Forbidden,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum BkError {
    #[error("Required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("Domain rule violated: {message}")]
    DomainRule { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("{entity} does not belong to this school")]
    TenancyViolation { entity: &'static str },

    #[error("Conflict: {reason}")]
    Conflict { reason: String },

    #[error("Operation not permitted for role: {reason}")]
    Forbidden { reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BkError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn rule(message: impl Into<String>) -> Self {
        Self::DomainRule {
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField { .. } => ErrorKind::MissingField,
            Self::DomainRule { .. } => ErrorKind::DomainRule,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::TenancyViolation { .. } => ErrorKind::Tenancy,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Database(_) | Self::Internal(_) => ErrorKind::Infrastructure,
        }
    }
}

pub type BkResult<T> = Result<T, BkError>;
