//!
//! idmap: content-addressed, lazily evaluated maps.
//!
//! A map built with this library assigns every field an identity derived from
//! its value or from the computation that will produce it. Identical content
//! built in different ways gets the same identity, values are computed only
//! when read, and whole maps can be saved to and rebuilt from a flat store.
//!
//! ## Core Concepts
//!
//! * **Identities (`identity::Identity`)**: Elements of a non-commutative group. Function
//!   applications combine argument identities in a canonical order; maps sum
//!   `entry * field name` over their fields.
//! * **Arguments (`argument::Argument`)**: What can be placed in a map: values, field
//!   references, defaults, random draws and deferred applications.
//! * **Entries (`entry::Entry`)**: Resolved fields: concrete values, memoized closures,
//!   outputs of multi-output closures and store-backed placeholders.
//! * **Frozen maps (`map::FrozenMap`)**: Immutable maps built in two phases so that items
//!   may reference each other in any order. Every change yields a new map that
//!   shares untouched entries.
//! * **Pipelines (`pipeline::Expr`)**: Deferred sequences of steps, sampled with an
//!   explicit seed and solved into one map.
//! * **Stores (`store::Store`)**: The key-value contract used for caching and for
//!   saving and loading maps.

pub mod argument;
pub mod constants;
pub mod entry;
pub mod function;
pub mod identity;
pub mod map;
pub mod pipeline;
pub mod store;
pub mod value;

pub use argument::{Application, Argument, Batch, Callee, Progression, Sample, Target};
pub use entry::Entry;
pub use function::{Appliable, Args, Function, FunctionError, Param};
pub use identity::{ID, Identifiable, Identity, IdentityError};
pub use map::{FrozenMap, Map, MapError, Slot};
pub use pipeline::{CacheDirective, Expr, Step, cache};
pub use store::{MemoryStore, Store, StoreError, Stored};
pub use value::{Value, ValueError};

/// Result type used throughout the idmap library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the idmap library.
///
/// Module errors are wrapped transparently; use the `is_*` helpers to check
/// for an error kind without matching on the module.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Identity(identity::IdentityError),

    #[error(transparent)]
    Value(value::ValueError),

    #[error(transparent)]
    Function(function::FunctionError),

    #[error(transparent)]
    Map(map::MapError),

    #[error(transparent)]
    Store(store::StoreError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Identity(_) => "identity",
            Error::Value(_) => "value",
            Error::Function(_) => "function",
            Error::Map(_) => "map",
            Error::Store(_) => "store",
        }
    }

    /// Check if this error is caused by calling the API incorrectly.
    pub fn is_usage_error(&self) -> bool {
        match self {
            Error::Function(function_err) => function_err.is_usage_error(),
            Error::Map(map_err) => map_err.is_usage_error(),
            Error::Store(store_err) => store_err.is_usage_error(),
            _ => false,
        }
    }

    /// Check if a referenced field has no value.
    pub fn is_missing_field(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_missing_field(),
            _ => false,
        }
    }

    pub fn is_illegal_overwrite(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_illegal_overwrite(),
            _ => false,
        }
    }

    pub fn is_conflicting_output(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_conflicting_output(),
            _ => false,
        }
    }

    /// Check if a multi-output target did not match the produced elements.
    pub fn is_cardinality_error(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_cardinality_error(),
            _ => false,
        }
    }

    /// Check if this error is about fields that are not resolved yet.
    pub fn is_unready(&self) -> bool {
        match self {
            Error::Map(map_err) => map_err.is_unready(),
            _ => false,
        }
    }

    /// Check if a value or a store could not be encoded or decoded.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Value(value_err) => value_err.is_serialization_error(),
            Error::Store(store_err) => store_err.is_serialization_error(),
            _ => false,
        }
    }

    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Value(value_err) => value_err.is_type_error(),
            Error::Function(FunctionError::NotCallable { .. }) => true,
            _ => false,
        }
    }

    /// Check if this error comes from a malformed id.
    pub fn is_identity_error(&self) -> bool {
        matches!(self, Error::Identity(_))
    }

    /// Check if a function body reported a failure.
    pub fn is_function_failure(&self) -> bool {
        matches!(self, Error::Function(FunctionError::Failed { .. }))
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if stored data is missing or inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_integrity_error(),
            Error::Identity(_) => true,
            _ => false,
        }
    }

    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }
}
