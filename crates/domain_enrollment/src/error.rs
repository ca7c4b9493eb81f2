//! Enrollment domain errors
//!
//! Every failure the domain can signal is one of four kinds: a rejected field,
//! a missing record, a storage constraint violation, or a rejected operation.
//! Store connectivity failures are carried separately so callers can tell
//! them apart from integrity problems.

use std::borrow::Cow;

use thiserror::Error;

use core_kernel::PortError;

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire
    pub field: String,
    /// Human readable reason
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing-field error
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "field is required")
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the alphabetically first field so the message is deterministic
        errors
            .field_errors()
            .into_iter()
            .min_by_key(|(field, _)| field.to_string())
            .and_then(|(field, errs)| {
                errs.first().map(|err| {
                    let reason = err
                        .message
                        .clone()
                        .unwrap_or_else(|| Cow::Owned(err.code.to_string()));
                    ValidationError::new(field.to_string(), reason.to_string())
                })
            })
            .unwrap_or_else(|| ValidationError::new("record", "invalid record"))
    }
}

/// Errors that can occur in the enrollment domain
#[derive(Debug, Error)]
pub enum EnrollmentError {
    /// Malformed, missing or out-of-range field
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced student or payment does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Storage constraint violation; the change was rolled back
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// Operation rejected in the current lifecycle state
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The store could not be reached or failed internally
    #[error("Store unavailable: {0}")]
    Store(String),
}

impl EnrollmentError {
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        EnrollmentError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        EnrollmentError::Precondition(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EnrollmentError::NotFound { .. })
    }
}

impl From<PortError> for EnrollmentError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound { entity_type, id } => EnrollmentError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Integrity { message } => EnrollmentError::Integrity(message),
            other => EnrollmentError::Store(other.to_string()),
        }
    }
}
