//!
//! The store contract used for caching values and persisting maps.
//!
//! A [`Store`] is a flat key-value mapping keyed by 40-character ids. A saved
//! map is a [`Stored::Table`] of field ids under the map id; every field value
//! is a [`Stored::Payload`] under the field id, or another table for nested
//! maps. Stores use interior mutability, so one store can be shared (as
//! `Rc<dyn Store>`) by every cached entry that reads or writes it.

mod decompose;
mod errors;
mod persistence;

pub use errors::StoreError;

pub(crate) use decompose::{load, persist_value, recompose, save};

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Result, identity::ID, value::Value};

/// An item kept in a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Stored {
    /// Field ids of a map, in field order.
    Table(IndexMap<String, ID>),
    /// A single field value.
    Payload(Value),
}

impl Stored {
    pub fn is_table(&self) -> bool {
        matches!(self, Stored::Table(_))
    }
}

/// Minimal key-value contract for caching and persistence.
///
/// Implementations only need to map ids to stored items. No locking is
/// performed; callers serialize access when a store is shared externally.
pub trait Store {
    /// The item stored under `id`, if any.
    fn get(&self, id: &ID) -> Result<Option<Stored>>;

    /// Store `item` under `id`, replacing any previous item.
    fn set(&self, id: &ID, item: Stored) -> Result<()>;

    fn contains(&self, id: &ID) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// A store kept in memory, with optional JSON file persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(crate) items: RefCell<BTreeMap<ID, Stored>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// All stored ids, sorted.
    pub fn ids(&self) -> Vec<ID> {
        self.items.borrow().keys().cloned().collect()
    }

    /// Ids of stored maps with their field counts.
    pub fn tables(&self) -> Vec<(ID, usize)> {
        self.items
            .borrow()
            .iter()
            .filter_map(|(id, item)| match item {
                Stored::Table(table) => Some((id.clone(), table.len())),
                Stored::Payload(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    /// Save every stored item to `path` as JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Load a store from a JSON file written by [`MemoryStore::save_to_file`].
    ///
    /// A missing file gives an empty store.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path)
    }
}

impl Store for MemoryStore {
    fn get(&self, id: &ID) -> Result<Option<Stored>> {
        let item = self.items.borrow().get(id).cloned();
        tracing::trace!(id = %id, hit = item.is_some(), "store lookup");
        Ok(item)
    }

    fn set(&self, id: &ID, item: Stored) -> Result<()> {
        self.items.borrow_mut().insert(id.clone(), item);
        Ok(())
    }

    fn contains(&self, id: &ID) -> Result<bool> {
        Ok(self.items.borrow().contains_key(id))
    }
}
