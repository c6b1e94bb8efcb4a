//! Error types for value handling.

use thiserror::Error;

/// Errors raised while hashing, persisting or inspecting a [`Value`](super::Value).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ValueError {
    /// The value has no canonical encoding, so no identity can be derived for it
    #[error("Cannot serialize value {value}: {reason}")]
    Serialization {
        /// Description of the offending value
        value: String,
        /// Why the value could not be encoded
        reason: String,
    },

    /// The value is not of the requested type
    #[error("Value type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ValueError {
    /// Check if this error means a value could not be encoded.
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, ValueError::Serialization { .. })
    }

    /// Check if this error is a type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, ValueError::TypeMismatch { .. })
    }
}

impl From<ValueError> for crate::Error {
    fn from(err: ValueError) -> Self {
        crate::Error::Value(err)
    }
}
