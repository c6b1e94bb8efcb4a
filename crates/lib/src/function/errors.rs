//! Error types for binding and calling functions.

use thiserror::Error;

/// Errors raised while binding arguments to a callable or while calling it.
///
/// Everything except [`FunctionError::Failed`] is a usage error.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FunctionError {
    /// More positional arguments than declared parameters
    #[error("{function}() takes {expected} arguments but {got} were given")]
    Arity {
        function: String,
        expected: usize,
        got: usize,
    },

    /// A keyword argument names no declared parameter
    #[error("{function}() got an unexpected argument '{param}'")]
    UnknownParameter { function: String, param: String },

    /// A parameter was given both positionally and by name
    #[error("{function}() got multiple values for argument '{param}'")]
    DuplicateArgument { function: String, param: String },

    /// A parameter has neither a supplied argument nor a default
    #[error("{function}() missing argument '{param}'")]
    MissingArgument { function: String, param: String },

    /// The applied entry does not hold a function
    #[error("Cannot apply a value of type {found}")]
    NotCallable { found: &'static str },

    /// The callee's parameters differ from the ones the application declared
    #[error("{function}{actual} does not match the declared signature {declared}")]
    SignatureMismatch {
        function: String,
        declared: String,
        actual: String,
    },

    /// The function body reported a failure
    #[error("{function}() failed: {reason}")]
    Failed { function: String, reason: String },
}

impl FunctionError {
    /// Convenience constructor for function bodies.
    pub fn failed(function: impl Into<String>, reason: impl Into<String>) -> Self {
        FunctionError::Failed {
            function: function.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is caused by calling the API incorrectly.
    pub fn is_usage_error(&self) -> bool {
        !matches!(self, FunctionError::Failed { .. })
    }
}

impl From<FunctionError> for crate::Error {
    fn from(err: FunctionError) -> Self {
        crate::Error::Function(err)
    }
}
