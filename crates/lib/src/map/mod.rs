//!
//! The frozen map: an immutable, identity-bearing mapping from field names to
//! entries.
//!
//! A [`FrozenMap`] is built once from an ordered batch of items and never
//! mutated afterwards. Every operation that changes content (`merge`,
//! `provide`, `apply`, `remove`, `cached`, `sample`) returns a new map that
//! shares the untouched entries with the old one, so their identities and
//! memoized values carry over.
//!
//! Fields that cannot be resolved yet are kept as unready [`Slot`]s. Such a
//! map is a valid intermediate pipeline state, but it has no identity and
//! reading an unready field fails.
//!
//! The map identity is the commutative sum of `entry * of_name(field)` over
//! every ordinary field. Mirror fields (`name_`) and metafields (`_name_`) are
//! kept in the map but do not contribute.

mod builder;
mod errors;
pub(crate) mod expand;
mod mutable;

pub use errors::MapError;
pub use mutable::Map;

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use rand::Rng;

use crate::{
    Result,
    argument::{Application, Argument, Batch, Target},
    constants::{META_MARKER, MIRROR_SUFFIX},
    entry::{Cached, Concrete, Entry},
    identity::{ID, Identifiable, Identity},
    store::{self, Store},
    value::Value,
};
use builder::Builder;

/// A raw item waiting to be resolved, shared by all fields of its target.
#[derive(Debug)]
pub struct Pending {
    target: Target,
    item: Argument,
}

impl Pending {
    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn item(&self) -> &Argument {
        &self.item
    }
}

/// The content of one field of a map.
#[derive(Debug, Clone)]
pub enum Slot {
    Ready(Entry),
    /// Referenced by another item but never defined.
    Missing,
    /// Waiting on fields that are not ready.
    Delayed(Rc<Pending>),
    /// Still holds a random draw.
    Unsampled(Rc<Pending>),
}

impl Slot {
    pub fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Slot::Ready(entry) => Some(entry),
            _ => None,
        }
    }
}

struct Inner {
    slots: IndexMap<String, Slot>,
    /// Blocking fields of each delayed field.
    waiting: HashMap<String, Vec<String>>,
    identity: Option<Identity>,
    ids: IndexMap<String, ID>,
}

/// An immutable, content-addressed map of lazily evaluated fields.
///
/// # Example
///
/// ```
/// use idmap::{Application, Batch, FrozenMap, Function, Value};
///
/// let add = Function::new("add", ["a", "b"], |args| {
///     Ok(Value::Int(args.i64("a")? + args.i64("b")?))
/// });
/// let map = FrozenMap::from_batch(Batch::new().with("a", 2).with("b", 3)).unwrap();
/// let map = map.apply(Application::new(add).output("c").unwrap()).unwrap();
///
/// assert_eq!(map.value("c").unwrap(), Value::Int(5));
/// assert_eq!(map.id().unwrap().len(), 40);
/// ```
#[derive(Clone)]
pub struct FrozenMap {
    inner: Rc<Inner>,
}

impl FrozenMap {
    /// The empty map.
    pub fn new() -> Self {
        Self::from_parts(IndexMap::new(), HashMap::new())
    }

    /// Build a map from one batch of items.
    pub fn from_batch(batch: Batch) -> Result<Self> {
        Self::new().merge(batch)
    }

    /// Build a map from already resolved entries, keeping their identities.
    pub fn from_entries<S: Into<String>>(
        entries: impl IntoIterator<Item = (S, Entry)>,
    ) -> Result<Self> {
        let mut builder = Builder::new();
        for (name, entry) in entries {
            builder.insert_entry(&name.into(), entry)?;
        }
        builder.finish()
    }

    fn from_parts(slots: IndexMap<String, Slot>, waiting: HashMap<String, Vec<String>>) -> Self {
        let mut identity = Some(Identity::ZERO);
        let mut ids = IndexMap::new();
        for (name, slot) in &slots {
            let Slot::Ready(entry) = slot else {
                identity = None;
                continue;
            };
            ids.insert(name.clone(), entry.id());
            // Metafields contribute zero, mirrors are views of their sibling.
            if is_mirror(name) || is_metafield(name) {
                continue;
            }
            if let Some(acc) = identity.as_mut() {
                *acc += entry.identity() * Identity::of_name(name);
            }
        }
        Self {
            inner: Rc::new(Inner {
                slots,
                waiting,
                identity,
                ids,
            }),
        }
    }

    /// Merge a batch of items on top of this map.
    ///
    /// Items may reference fields of this map and of the batch itself, in any
    /// order. Overwriting a field of this map that is not ready is an error;
    /// use [`FrozenMap::provide`] for that.
    pub fn merge(&self, batch: Batch) -> Result<Self> {
        let mut builder = Builder::from_map(self);
        let count = batch.len();
        for (target, item) in batch {
            builder.install(target, item)?;
        }
        let map = builder.finish()?;
        tracing::debug!(items = count, fields = map.len(), "merged batch");
        Ok(map)
    }

    /// Merge another map on top of this one.
    ///
    /// Ready entries of `other` are taken as they are; its unready items are
    /// resolved again against the combined content.
    pub fn merge_map(&self, other: &FrozenMap) -> Result<Self> {
        let mut builder = Builder::from_map(self);
        for (name, slot) in &other.inner.slots {
            match slot {
                Slot::Ready(entry) => builder.insert_entry(name, entry.clone())?,
                Slot::Missing => builder.insert_missing(name),
                Slot::Delayed(_) | Slot::Unsampled(_) => {}
            }
        }
        for pending in other.pending() {
            builder.install(pending.target.clone(), pending.item.clone())?;
        }
        let map = builder.finish()?;
        tracing::debug!(fields = map.len(), "merged map");
        Ok(map)
    }

    /// Merge an application under its declared output.
    pub fn apply(&self, app: Application) -> Result<Self> {
        self.merge(Batch::new().apply(app)?)
    }

    /// Fill fields that this map is still waiting for.
    ///
    /// Items whose fields are all ready in this map are skipped: the map's own
    /// content wins. Unready fields may be overwritten here, and everything
    /// waiting on them is resolved again.
    pub fn provide(&self, batch: Batch) -> Result<Self> {
        let mut ignore = Vec::new();
        let mut items = Vec::new();
        for (target, item) in batch {
            let names = target.names();
            if names.iter().all(|name| self.slot(name).is_some_and(Slot::is_ready)) {
                tracing::trace!(output = %target, "field already present, not provided");
                continue;
            }
            ignore.extend(names.into_iter().map(str::to_string));
            items.push((target, item));
        }

        let mut builder = Builder::from_map(self).ignoring(ignore);
        for (target, item) in items {
            builder.install(target, item)?;
        }
        builder.finish()
    }

    /// A copy of this map without the named fields.
    pub fn remove<S: AsRef<str>>(&self, names: impl IntoIterator<Item = S>) -> Result<Self> {
        let mut builder = Builder::from_map(self);
        for name in names {
            let name = name.as_ref();
            if builder.remove(name).is_none() {
                return Err(MapError::MissingField {
                    field: name.to_string(),
                }
                .into());
            }
        }
        builder.finish()
    }

    /// Back the named fields with `store`, or every unevaluated field when
    /// `fields` is empty.
    ///
    /// Each field becomes a [`Cached`] entry that reads the store before
    /// computing, and writes computed values back.
    pub fn cached<S: AsRef<str>>(
        &self,
        store: &Rc<dyn Store>,
        fields: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let mut names: Vec<String> = fields.into_iter().map(|s| s.as_ref().to_string()).collect();
        if names.is_empty() {
            names = self
                .entries()
                .filter(|(_, entry)| !entry.is_evaluated())
                .map(|(name, _)| name.to_string())
                .collect();
        }

        let mut builder = Builder::from_map(self);
        for name in &names {
            let entry = match self.slot(name) {
                Some(Slot::Ready(entry)) => entry.clone(),
                Some(_) => {
                    return Err(MapError::Unready {
                        fields: vec![name.clone()],
                    }
                    .into());
                }
                None => {
                    return Err(MapError::MissingField {
                        field: name.clone(),
                    }
                    .into());
                }
            };
            if matches!(entry, Entry::Cached(_)) {
                continue;
            }
            let cached = Cached::new(entry.identity(), store.clone(), Some(entry));
            builder.replace_entry(name, Entry::Cached(Rc::new(cached)));
        }
        tracing::debug!(fields = names.len(), "cached fields");
        builder.finish()
    }

    /// Resolve every pending draw with `rng`, in field order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Self> {
        let unsampled: Vec<Rc<Pending>> = self
            .pending()
            .into_iter()
            .filter(|pending| pending.item.is_sampleable())
            .collect();
        if unsampled.is_empty() {
            return Ok(self.clone());
        }

        let ignore: Vec<String> = unsampled
            .iter()
            .flat_map(|pending| pending.target.names())
            .map(str::to_string)
            .collect();
        let mut builder = Builder::from_map(self).ignoring(ignore);
        for pending in unsampled {
            builder.install(pending.target.clone(), pending.item.sample(rng))?;
        }
        builder.finish()
    }

    /// Distinct unready items, in field order.
    fn pending(&self) -> Vec<Rc<Pending>> {
        let mut found: Vec<Rc<Pending>> = Vec::new();
        for slot in self.inner.slots.values() {
            if let Slot::Delayed(pending) | Slot::Unsampled(pending) = slot {
                if !found.iter().any(|p| Rc::ptr_eq(p, pending)) {
                    found.push(pending.clone());
                }
            }
        }
        found
    }

    /// Force every field.
    pub fn evaluate(&self) -> Result<()> {
        for name in self.inner.slots.keys() {
            self.value(name)?;
        }
        Ok(())
    }

    /// A copy of this map with every field replaced by its value, keeping
    /// field identities.
    pub fn evaluated(&self) -> Result<Self> {
        let mut builder = Builder::new();
        for name in self.inner.slots.keys() {
            let value = self.value(name)?;
            let entry = match self.get(name) {
                Some(Entry::Concrete(concrete)) => Entry::Concrete(concrete.clone()),
                Some(entry) => Entry::Concrete(Rc::new(Concrete::with_identity(
                    value,
                    entry.identity(),
                ))),
                None => continue,
            };
            builder.insert_entry(name, entry)?;
        }
        builder.finish()
    }

    /// Value of a field, computing it if needed.
    pub fn value(&self, name: &str) -> Result<Value> {
        match self.slot(name) {
            Some(Slot::Ready(entry)) => entry.value(),
            Some(Slot::Unsampled(_)) => Err(MapError::Unsampled {
                field: name.to_string(),
            }
            .into()),
            Some(Slot::Delayed(_)) => Err(self.blocked_error(name)),
            Some(Slot::Missing) | None => Err(MapError::MissingField {
                field: name.to_string(),
            }
            .into()),
        }
    }

    /// Error for a delayed field, naming the field it ultimately waits on.
    fn blocked_error(&self, name: &str) -> crate::Error {
        let mut seen = vec![name.to_string()];
        let mut stack = vec![name.to_string()];
        while let Some(current) = stack.pop() {
            for blocker in self.inner.waiting.get(&current).into_iter().flatten() {
                if seen.contains(blocker) {
                    continue;
                }
                seen.push(blocker.clone());
                match self.slot(blocker) {
                    Some(Slot::Delayed(_)) => stack.push(blocker.clone()),
                    Some(Slot::Unsampled(_)) => {
                        return MapError::Unsampled {
                            field: blocker.clone(),
                        }
                        .into();
                    }
                    _ => {
                        return MapError::MissingField {
                            field: blocker.clone(),
                        }
                        .into();
                    }
                }
            }
        }
        MapError::MissingField {
            field: name.to_string(),
        }
        .into()
    }

    /// The entry of a ready field.
    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.slot(name).and_then(Slot::entry)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.inner.slots.get(name)
    }

    /// Ready fields and their entries, in field order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.inner
            .slots
            .iter()
            .filter_map(|(name, slot)| slot.entry().map(|entry| (name.as_str(), entry)))
    }

    /// Identity of the map; fails while any field is unready.
    pub fn identity(&self) -> Result<Identity> {
        self.inner.identity.ok_or_else(|| {
            MapError::Unready {
                fields: self.unready(),
            }
            .into()
        })
    }

    pub fn id(&self) -> Result<ID> {
        Ok(self.identity()?.id())
    }

    /// Ids of the ready fields, in field order.
    pub fn ids(&self) -> &IndexMap<String, ID> {
        &self.inner.ids
    }

    pub fn is_ready(&self) -> bool {
        self.inner.identity.is_some()
    }

    /// Names of every field that is not ready.
    pub fn unready(&self) -> Vec<String> {
        self.inner
            .slots
            .iter()
            .filter(|(_, slot)| !slot.is_ready())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Names of fields referenced but never defined.
    pub fn missing(&self) -> Vec<String> {
        self.inner
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Missing))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.slots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.slots.contains_key(name)
    }

    /// Write this map and everything it holds into `store`. Returns the map id.
    pub fn save(&self, store: &dyn Store) -> Result<ID> {
        store::save(self, store)
    }

    /// Rebuild the map stored under `id`.
    ///
    /// Returns `Ok(None)` when the id is not in the store. With `lazy`, fields
    /// are fetched from the store on first access.
    pub fn load(id: &ID, store: &Rc<dyn Store>, lazy: bool) -> Result<Option<Self>> {
        store::load(id, store, lazy)
    }

    /// Lazily rebuild the map stored under `id`.
    pub fn fetch(id: &ID, store: &Rc<dyn Store>) -> Result<Option<Self>> {
        store::load(id, store, true)
    }
}

impl Default for FrozenMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FrozenMap {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.inner.identity, other.inner.identity) {
            return a == b;
        }
        self.len() == other.len()
            && self.inner.slots.iter().all(|(name, slot)| {
                match (slot, other.slot(name)) {
                    (Slot::Ready(a), Some(Slot::Ready(b))) => a.identity() == b.identity(),
                    (Slot::Missing, Some(Slot::Missing)) => true,
                    (Slot::Delayed(a), Some(Slot::Delayed(b)))
                    | (Slot::Unsampled(a), Some(Slot::Unsampled(b))) => {
                        a.target == b.target && a.item == b.item
                    }
                    _ => false,
                }
            })
    }
}

/// Compare with a precomputed map id.
impl PartialEq<ID> for FrozenMap {
    fn eq(&self, other: &ID) -> bool {
        self.id().is_ok_and(|id| id == *other)
    }
}

impl std::fmt::Debug for FrozenMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrozenMap")
            .field("id", &self.id().ok())
            .field("slots", &self.inner.slots)
            .finish()
    }
}

impl std::fmt::Display for FrozenMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, slot)) in self.inner.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match slot {
                Slot::Ready(entry) => write!(f, "{name}: {entry}")?,
                Slot::Missing => write!(f, "{name}: <missing>")?,
                Slot::Delayed(_) => write!(f, "{name}: <delayed>")?,
                Slot::Unsampled(_) => write!(f, "{name}: <unsampled>")?,
            }
        }
        write!(f, "}}")
    }
}

/// A mirror field (`name_`) is a view of its sibling and has no identity share.
pub fn is_mirror(name: &str) -> bool {
    name.ends_with(MIRROR_SUFFIX) && !name.starts_with(META_MARKER)
}

/// A metafield (`_name_`) is carried along with a zero identity share.
pub fn is_metafield(name: &str) -> bool {
    name.len() > 2 && name.starts_with(META_MARKER) && name.ends_with(META_MARKER)
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MapError::usage("field names cannot be empty").into());
    }
    if name.starts_with(META_MARKER) && !is_metafield(name) {
        return Err(MapError::usage(format!(
            "field name '{name}' is reserved; only metafields of the form _name_ may start with '{META_MARKER}'"
        ))
        .into());
    }
    Ok(())
}
