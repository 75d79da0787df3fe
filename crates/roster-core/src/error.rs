//! Domain-specific error types following panic-free policy.

use thiserror::Error;

/// Errors that can occur in domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Required field absent or empty
    #[error("Missing required field: {field}")]
    MissingField { field: String },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
