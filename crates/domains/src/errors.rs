//! # DomainError
//!
//! Centralized error handling for the marketplace.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

use crate::models::ItemStatus;

/// The primary error type for all domain and service operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// A required wizard field is missing or a value is out of range.
    /// Raised before anything reaches the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing or invalid bearer token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but the caller does not own the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (e.g., Item, Profile)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Status changes are only allowed out of `active`.
    #[error("cannot move item from {from} to {to}")]
    InvalidTransition { from: ItemStatus, to: ItemStatus },

    /// The relational store is unreachable or rejected the query.
    #[error("store unavailable: {0}")]
    Store(String),

    /// The blob store rejected a file.
    #[error("upload failed: {0}")]
    Upload(String),

    /// The external channel could not be notified. Never surfaced to users.
    #[error("notification failed: {0}")]
    Notify(String),
}

impl DomainError {
    pub fn not_found(kind: &str, id: impl ToString) -> Self {
        Self::NotFound(kind.to_string(), id.to_string())
    }

    /// Stable machine-readable code used in API bodies and log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(..) => "NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Store(_) => "STORE_ERROR",
            Self::Upload(_) => "UPLOAD_ERROR",
            Self::Notify(_) => "NOTIFY_ERROR",
        }
    }
}

/// A specialized Result type for marketplace logic.
pub type Result<T> = std::result::Result<T, DomainError>;
