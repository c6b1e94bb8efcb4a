//! Error types for map building and reading.

use thiserror::Error;

/// Errors raised while building, merging or reading a [`FrozenMap`](super::FrozenMap).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MapError {
    /// The API was called incorrectly
    #[error("Usage error: {reason}")]
    Usage { reason: String },

    /// A referenced field has no value in the map
    #[error("Missing field '{field}'")]
    MissingField { field: String },

    /// A field that is still waiting for a value was overwritten directly
    #[error("Cannot overwrite unready field '{field}'; provide its value instead")]
    IllegalOverwrite { field: String },

    /// An application declared its own output and was also placed under a key
    #[error("Conflicting outputs for '{field}': the application already declares its output")]
    ConflictingOutput { field: String },

    /// A multi-output target does not match the number of produced elements
    #[error("Cannot unpack {actual} elements into {expected} fields")]
    Cardinality { expected: usize, actual: usize },

    /// The map holds fields that are not ready, so it has no identity yet
    #[error("Map is not ready; unready fields: {}", fields.join(", "))]
    Unready { fields: Vec<String> },

    /// The field still holds an unresolved random draw
    #[error("Field '{field}' has not been sampled")]
    Unsampled { field: String },

    /// Fields depend on each other in a loop
    #[error("Cyclic field references: {}", fields.join(" -> "))]
    Cycle { fields: Vec<String> },
}

impl MapError {
    /// Convenience constructor for usage errors.
    pub fn usage(reason: impl Into<String>) -> Self {
        MapError::Usage {
            reason: reason.into(),
        }
    }

    /// Check if this error is caused by calling the API incorrectly.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            MapError::Usage { .. } | MapError::ConflictingOutput { .. } | MapError::Cycle { .. }
        )
    }

    pub fn is_missing_field(&self) -> bool {
        matches!(self, MapError::MissingField { .. })
    }

    pub fn is_illegal_overwrite(&self) -> bool {
        matches!(self, MapError::IllegalOverwrite { .. })
    }

    pub fn is_conflicting_output(&self) -> bool {
        matches!(self, MapError::ConflictingOutput { .. })
    }

    pub fn is_cardinality_error(&self) -> bool {
        matches!(self, MapError::Cardinality { .. })
    }

    /// Check if this error is about fields that are not resolved yet.
    pub fn is_unready(&self) -> bool {
        matches!(self, MapError::Unready { .. } | MapError::Unsampled { .. })
    }

    pub fn is_cycle(&self) -> bool {
        matches!(self, MapError::Cycle { .. })
    }
}

impl From<MapError> for crate::Error {
    fn from(err: MapError) -> Self {
        crate::Error::Map(err)
    }
}
