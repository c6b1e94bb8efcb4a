//! Multi-output expansion.
//!
//! Splits one resolved entry across the fields of a [`Target`]. Concrete list
//! and dict values are split immediately; anything else yields one
//! [`SubEntry`] per field over the shared parent entry.

use std::rc::Rc;

use crate::{
    Result,
    argument::Target,
    entry::{Entry, SubEntry},
    map::MapError,
    value::Value,
};

/// Assign `entry` to the fields of `target`.
///
/// Cardinality is checked before any entry is produced, so a failure leaves
/// nothing half-assigned.
pub(crate) fn expand(target: &Target, entry: Entry) -> Result<Vec<(String, Entry)>> {
    match target {
        Target::Single(name) => Ok(vec![(name.clone(), entry)]),
        Target::Many(names) => match concrete_value(&entry) {
            Some(value) => split(names, value),
            None => Ok(sub_entries(
                entry,
                names.iter().map(|name| (name.clone(), None)).collect(),
            )),
        },
        Target::Renamed(pairs) => {
            let mut sorted: Vec<&(String, String)> = pairs.iter().collect();
            sorted.sort_by(|(_, a), (_, b)| a.cmp(b));
            match concrete_value(&entry) {
                Some(value) => pick(&sorted, value),
                None => Ok(sub_entries(
                    entry,
                    sorted
                        .into_iter()
                        .map(|(target, source)| {
                            (target.clone(), Some(Value::Text(source.clone())))
                        })
                        .collect(),
                )),
            }
        }
    }
}

fn concrete_value(entry: &Entry) -> Option<&Value> {
    match entry {
        Entry::Concrete(concrete) => Some(concrete.value()),
        _ => None,
    }
}

fn check_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(MapError::Cardinality { expected, actual }.into());
    }
    Ok(())
}

/// Positional split of a concrete list, or of a dict by sorted key.
fn split(names: &[String], value: &Value) -> Result<Vec<(String, Entry)>> {
    let items: Vec<Value> = match value {
        Value::List(items) => {
            check_len(names.len(), items.len())?;
            items.clone()
        }
        Value::Dict(pairs) => {
            check_len(names.len(), pairs.len())?;
            let mut sorted: Vec<&(Value, Value)> = pairs.iter().collect();
            sorted.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));
            sorted.into_iter().map(|(_, v)| v.clone()).collect()
        }
        other => {
            return Err(MapError::usage(format!(
                "cannot unpack a {} value into {} fields",
                other.type_name(),
                names.len()
            ))
            .into());
        }
    };

    names
        .iter()
        .zip(items)
        .map(|(name, item)| Ok((name.clone(), Entry::concrete(item)?)))
        .collect()
}

/// Pick renamed outputs out of a concrete dict by source key.
fn pick(pairs: &[&(String, String)], value: &Value) -> Result<Vec<(String, Entry)>> {
    let Value::Dict(entries) = value else {
        return Err(MapError::usage(format!(
            "renamed outputs need a dict, got {}",
            value.type_name()
        ))
        .into());
    };
    check_len(pairs.len(), entries.len())?;

    pairs
        .iter()
        .map(|(target, source)| {
            let item = value.get(&Value::Text(source.clone())).ok_or_else(|| {
                MapError::usage(format!("value has no key '{source}' for field '{target}'"))
            })?;
            Ok((target.clone(), Entry::concrete(item.clone())?))
        })
        .collect()
}

fn sub_entries(parent: Entry, fields: Vec<(String, Option<Value>)>) -> Vec<(String, Entry)> {
    let total = fields.len();
    fields
        .into_iter()
        .enumerate()
        .map(|(index, (name, source_key))| {
            let sub = SubEntry::new(parent.clone(), index, total, source_key);
            (name, Entry::Sub(Rc::new(sub)))
        })
        .collect()
}
