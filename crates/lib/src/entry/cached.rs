//! Entries backed by an external store.

use std::rc::Rc;

use crate::{
    Result,
    entry::{Entry, memo::Memo},
    identity::{Identifiable, Identity},
    store::{self, Store, StoreError, Stored},
    value::Value,
};

/// A placeholder for a value kept in a [`Store`] under its identity.
///
/// Reading the value tries, in order: an already evaluated fallback entry,
/// the store, and finally evaluating the fallback and writing the result back
/// to the store.
pub struct Cached {
    identity: Identity,
    store: Rc<dyn Store>,
    fallback: Option<Entry>,
    memo: Memo,
}

impl Cached {
    pub(crate) fn new(identity: Identity, store: Rc<dyn Store>, fallback: Option<Entry>) -> Self {
        Self {
            identity,
            store,
            fallback,
            memo: Memo::new(),
        }
    }

    /// The in-memory entry this placeholder wraps, if any.
    pub fn fallback(&self) -> Option<&Entry> {
        self.fallback.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.memo.is_evaluated()
            || self
                .fallback
                .as_ref()
                .is_some_and(|fallback| fallback.is_evaluated())
    }

    pub(crate) fn peek(&self) -> Option<Value> {
        self.memo
            .get()
            .or_else(|| self.fallback.as_ref().and_then(Entry::peek))
    }

    pub fn value(&self) -> Result<Value> {
        self.memo.get_or_try_init(|| self.fetch())
    }

    fn fetch(&self) -> Result<Value> {
        if let Some(fallback) = self.fallback.as_ref().filter(|f| f.is_evaluated()) {
            return fallback.value();
        }

        let id = self.identity.id();
        match self.store.get(&id)? {
            Some(Stored::Payload(value)) => {
                tracing::trace!(id = %id, "cache hit");
                Ok(value)
            }
            Some(Stored::Table(table)) => {
                tracing::trace!(id = %id, "cache hit for nested map");
                Ok(Value::Map(store::recompose(&table, &self.store, true)?))
            }
            None => match &self.fallback {
                Some(fallback) => {
                    let value = fallback.value()?;
                    store::persist_value(&id, &value, self.store.as_ref())?;
                    tracing::debug!(id = %id, "cached computed value");
                    Ok(value)
                }
                None => Err(StoreError::Incomplete { id }.into()),
            },
        }
    }
}

impl Identifiable for Cached {
    fn identity(&self) -> Identity {
        self.identity
    }
}

impl std::fmt::Debug for Cached {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cached")
            .field("identity", &self.identity)
            .field("has_fallback", &self.fallback.is_some())
            .field("evaluated", &self.is_evaluated())
            .finish()
    }
}
