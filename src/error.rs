//! Structured error types for cook orchestration
//!
//! Submission errors are surfaced synchronously to the caller of the
//! operation that triggered them; generation failures never appear here
//! because they only surface as completion records observed through
//! reconciliation.

use thiserror::Error;
use uuid::Uuid;

/// Result alias used throughout the cook engine
pub type CookResult<T> = Result<T, CookError>;

/// Main error type for cook orchestration operations
#[derive(Debug, Error)]
pub enum CookError {
    // Submission errors: returned from `start` before any state is mutated
    #[error("Generator {generator_id} not found")]
    GeneratorNotFound { generator_id: String },

    #[error("User {user_id} is not permitted to invoke generator {generator_id}: {reason}")]
    PermissionDenied {
        user_id: String,
        generator_id: String,
        reason: String,
    },

    #[error("Invalid target supply {supply}: {reason}")]
    InvalidTargetSupply { supply: u64, reason: String },

    #[error("Trait template cannot produce a unit: {reason}")]
    UnitResolution { reason: String },

    // Lookup errors
    #[error("Collection {collection_id} not found")]
    CollectionNotFound { collection_id: String },

    #[error("Cook attempt {attempt_id} not found")]
    AttemptNotFound { attempt_id: Uuid },

    // Consistency errors: the store was unreachable or refused the write.
    // No implicit retry loop; the caller (or a scheduled reconciliation
    // sweep) retries.
    #[error("Store operation {operation} failed: {message}")]
    Store {
        operation: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Dispatch of unit {unit_id} failed: {message}")]
    Dispatch {
        unit_id: Uuid,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl CookError {
    /// Create a store error without an underlying source
    pub fn store(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error wrapping an underlying source
    pub fn store_with_source(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            operation: operation.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a unit resolution error
    pub fn unit_resolution(reason: impl Into<String>) -> Self {
        Self::UnitResolution {
            reason: reason.into(),
        }
    }

    /// Whether this error is a synchronous submission error (caller input
    /// was rejected; nothing was dispatched on its behalf)
    pub fn is_submission_error(&self) -> bool {
        matches!(
            self,
            CookError::GeneratorNotFound { .. }
                | CookError::PermissionDenied { .. }
                | CookError::InvalidTargetSupply { .. }
                | CookError::UnitResolution { .. }
        )
    }
}
