//! Error types for store operations.

use thiserror::Error;

use crate::identity::ID;

/// Errors raised while saving maps to, or rebuilding them from, a [`Store`](super::Store).
///
/// An id that is simply absent from the store is not an error; loading it
/// returns `Ok(None)`.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A field referenced by a stored map has no stored value
    #[error("Store is incomplete: nothing stored under {id}")]
    Incomplete { id: ID },

    /// The id refers to a payload where a map was expected
    #[error("Stored item {id} is not a map")]
    NotAMap { id: ID },

    /// Mirror fields cannot be persisted
    #[error("Cannot save mirror field '{field}'")]
    MirrorField { field: String },

    /// The value kind has no stored form
    #[error("Cannot store a {kind} value under {id}")]
    NotPersistable { id: ID, kind: &'static str },

    /// A rebuilt map does not hash to the id it was stored under
    #[error("Identity mismatch: stored under {expected}, rebuilt as {actual}")]
    IdentityMismatch { expected: ID, actual: ID },

    /// File I/O failed while persisting a store
    #[error("File I/O error")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// Store content could not be serialized
    #[error("Serialization failed")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// A store file could not be deserialized
    #[error("Deserialization failed")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Check if this error means stored data is missing or inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            StoreError::Incomplete { .. }
                | StoreError::NotAMap { .. }
                | StoreError::IdentityMismatch { .. }
        )
    }

    pub fn is_io_error(&self) -> bool {
        matches!(self, StoreError::FileIo { .. })
    }

    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::SerializationFailed { .. } | StoreError::DeserializationFailed { .. }
        )
    }

    /// Check if this error is caused by asking to store something unsupported.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            StoreError::MirrorField { .. } | StoreError::NotPersistable { .. }
        )
    }

    /// The id involved, if any.
    pub fn id(&self) -> Option<&ID> {
        match self {
            StoreError::Incomplete { id }
            | StoreError::NotAMap { id }
            | StoreError::NotPersistable { id, .. } => Some(id),
            StoreError::IdentityMismatch { expected, .. } => Some(expected),
            _ => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
