//! JSON file persistence for [`MemoryStore`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use super::{MemoryStore, StoreError, Stored};
use crate::{Error, Result, constants::PERSISTENCE_VERSION, identity::ID};

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// On-disk layout of a store file.
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    items: BTreeMap<ID, Stored>,
}

pub(super) fn save_to_file<P: AsRef<Path>>(store: &MemoryStore, path: P) -> Result<()> {
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        items: store.items.borrow().clone(),
    };
    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
    std::fs::write(path.as_ref(), json)
        .map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })?;
    tracing::debug!(path = %path.as_ref().display(), items = serializable.items.len(), "saved store");
    Ok(())
}

pub(super) fn load_from_file<P: AsRef<Path>>(path: P) -> Result<MemoryStore> {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(json) => {
            let serializable: SerializableStore = serde_json::from_str(&json).map_err(|e| -> Error {
                StoreError::DeserializationFailed { source: e }.into()
            })?;
            tracing::debug!(path = %path.as_ref().display(), items = serializable.items.len(), "loaded store");
            Ok(MemoryStore {
                items: RefCell::new(serializable.items),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MemoryStore::new()),
        Err(e) => Err(StoreError::FileIo { source: e }.into()),
    }
}
