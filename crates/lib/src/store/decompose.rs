//! Decomposing maps into a store and recomposing them.

use std::rc::Rc;

use indexmap::IndexMap;

use super::{Store, StoreError, Stored};
use crate::{
    Result,
    entry::{Cached, Concrete, Entry},
    identity::{ID, Identifiable, Identity},
    map::{FrozenMap, is_mirror},
    value::{Value, ValueError},
};

/// Write `map` and every field value into `store`. Returns the map id.
///
/// Values already present under their id are not evaluated again.
pub(crate) fn save(map: &FrozenMap, store: &dyn Store) -> Result<ID> {
    let id = map.id()?;
    if let Some(field) = map.keys().find(|name| is_mirror(name)) {
        return Err(StoreError::MirrorField {
            field: field.to_string(),
        }
        .into());
    }

    let table = decompose(map, store)?;
    let fields = table.len();
    store.set(&id, Stored::Table(table))?;
    tracing::debug!(id = %id, fields, "saved map");
    Ok(id)
}

fn decompose(map: &FrozenMap, store: &dyn Store) -> Result<IndexMap<String, ID>> {
    let mut table = IndexMap::new();
    for (name, entry) in map.entries() {
        let field_id = entry.id();
        if !store.contains(&field_id)? {
            persist_value(&field_id, &entry.value()?, store)?;
        }
        table.insert(name.to_string(), field_id);
    }
    Ok(table)
}

/// Store one value under `id`. Nested maps are stored as tables.
pub(crate) fn persist_value(id: &ID, value: &Value, store: &dyn Store) -> Result<()> {
    match value {
        Value::Map(map) => {
            let map_id = save(map, store)?;
            // A computed map is also reachable under the id of its computation.
            if map_id != *id {
                let table = decompose(map, store)?;
                store.set(id, Stored::Table(table))?;
            }
        }
        other => {
            if let Some(kind) = unpersistable(other) {
                return Err(StoreError::NotPersistable {
                    id: id.clone(),
                    kind,
                }
                .into());
            }
            // JSON has no encoding for these; storing one would make the
            // whole store file unreadable.
            if let Some(float) = non_finite(other) {
                return Err(ValueError::Serialization {
                    value: float.to_string(),
                    reason: format!("non-finite floats cannot be stored (under {id})"),
                }
                .into());
            }
            store.set(id, Stored::Payload(other.clone()))?;
        }
    }
    tracing::trace!(id = %id, "stored value");
    Ok(())
}

/// Kind of the first nested value that has no stored form.
fn unpersistable(value: &Value) -> Option<&'static str> {
    match value {
        Value::Map(_) | Value::Function(_) => Some(value.type_name()),
        Value::List(items) => items.iter().find_map(unpersistable),
        Value::Dict(pairs) => pairs
            .iter()
            .find_map(|(k, v)| unpersistable(k).or_else(|| unpersistable(v))),
        _ => None,
    }
}

/// The first nested float that is NaN or infinite.
fn non_finite(value: &Value) -> Option<&Value> {
    match value {
        Value::Float(f) if !f.is_finite() => Some(value),
        Value::List(items) => items.iter().find_map(non_finite),
        Value::Dict(pairs) => pairs
            .iter()
            .find_map(|(k, v)| non_finite(k).or_else(|| non_finite(v))),
        _ => None,
    }
}

/// Rebuild a map from its stored table.
///
/// Lazy recomposition creates one [`Cached`] entry per field; otherwise every
/// value is read now and a missing one is an error.
pub(crate) fn recompose(
    table: &IndexMap<String, ID>,
    store: &Rc<dyn Store>,
    lazy: bool,
) -> Result<FrozenMap> {
    let mut entries = Vec::with_capacity(table.len());
    for (name, field_id) in table {
        let identity = Identity::from_id(field_id)?;
        let entry = if lazy {
            Entry::Cached(Rc::new(Cached::new(identity, store.clone(), None)))
        } else {
            let value = match store.get(field_id)? {
                Some(Stored::Payload(value)) => value,
                Some(Stored::Table(nested)) => Value::Map(recompose(&nested, store, false)?),
                None => {
                    return Err(StoreError::Incomplete {
                        id: field_id.clone(),
                    }
                    .into());
                }
            };
            Entry::Concrete(Rc::new(Concrete::with_identity(value, identity)))
        };
        entries.push((name.clone(), entry));
    }
    FrozenMap::from_entries(entries)
}

/// Rebuild the map stored under `id`, or `None` if the store does not have it.
pub(crate) fn load(id: &ID, store: &Rc<dyn Store>, lazy: bool) -> Result<Option<FrozenMap>> {
    let table = match store.get(id)? {
        None => {
            tracing::debug!(id = %id, "map not in store");
            return Ok(None);
        }
        Some(Stored::Payload(_)) => return Err(StoreError::NotAMap { id: id.clone() }.into()),
        Some(Stored::Table(table)) => table,
    };

    let map = recompose(&table, store, lazy)?;
    let actual = map.id()?;
    if actual != *id {
        return Err(StoreError::IdentityMismatch {
            expected: id.clone(),
            actual,
        }
        .into());
    }
    tracing::debug!(id = %id, fields = map.len(), lazy, "loaded map");
    Ok(Some(map))
}
