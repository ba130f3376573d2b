//! Domain-level error taxonomy.
//!
//! Inbound adapters map these to HTTP statuses; the CLI maps them to exit
//! codes. Port adapters raise their own error enums and services translate
//! them into this taxonomy at the boundary.

/// Failure categories surfaced by domain services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// A uniqueness constraint was violated (duplicate email, plate, or
    /// obligation key).
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// A referenced user, vehicle, or obligation does not exist.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Input failed validation before reaching storage.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The storage backend is unavailable or misbehaving.
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl LedgerError {
    /// Create a [`LedgerError::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a [`LedgerError::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a [`LedgerError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a [`LedgerError::Storage`].
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Convenient result alias for domain operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
