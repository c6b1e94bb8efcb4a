//! Error types for parsing identities.

use thiserror::Error;

/// Errors that can occur when turning an [`ID`](super::ID) back into an
/// [`Identity`](super::Identity).
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The textual id does not have the expected length
    #[error("Invalid identity length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// The textual id contains characters outside the lower-case hex alphabet
    #[error("Invalid identity encoding: {0}")]
    InvalidHex(String),

    /// A decoded coordinate is not below the group modulus
    #[error("Identity coordinate out of range in {0}")]
    OutOfRange(String),
}

impl IdentityError {
    /// Check if this error comes from a malformed textual id.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidLength { .. } | IdentityError::InvalidHex(_)
        )
    }
}

impl From<IdentityError> for crate::Error {
    fn from(err: IdentityError) -> Self {
        crate::Error::Identity(err)
    }
}
