//! A mutable view over a frozen map.

use std::rc::Rc;

use rand::Rng;

use crate::{
    Result,
    argument::{Application, Argument, Batch, Target},
    entry::Entry,
    identity::{ID, Identity},
    map::FrozenMap,
    store::Store,
    value::Value,
};

/// Incremental building on top of [`FrozenMap`].
///
/// Each mutation builds a new frozen snapshot and swaps it in; snapshots
/// handed out earlier through [`Map::frozen`] never change.
///
/// # Example
///
/// ```
/// use idmap::{Argument, Map, Value};
///
/// let mut map = Map::new();
/// map.set("x", 2).unwrap();
/// map.set("y", Argument::field("x")).unwrap();
/// assert_eq!(map.value("y").unwrap(), Value::Int(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    frozen: FrozenMap,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one field (or several, for a multi-output target).
    pub fn set(&mut self, target: impl Into<Target>, item: impl Into<Argument>) -> Result<()> {
        self.extend(Batch::new().with(target, item))
    }

    /// Merge a batch of items.
    pub fn extend(&mut self, batch: Batch) -> Result<()> {
        self.frozen = self.frozen.merge(batch)?;
        Ok(())
    }

    /// Fill fields the map is waiting for.
    pub fn provide(&mut self, batch: Batch) -> Result<()> {
        self.frozen = self.frozen.provide(batch)?;
        Ok(())
    }

    pub fn apply(&mut self, app: Application) -> Result<()> {
        self.frozen = self.frozen.apply(app)?;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        self.frozen = self.frozen.remove([name])?;
        Ok(())
    }

    /// Back the named fields (or every unevaluated one) with `store`.
    pub fn cache<S: AsRef<str>>(
        &mut self,
        store: &Rc<dyn Store>,
        fields: impl IntoIterator<Item = S>,
    ) -> Result<()> {
        self.frozen = self.frozen.cached(store, fields)?;
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.frozen = self.frozen.sample(rng)?;
        Ok(())
    }

    pub fn value(&self, name: &str) -> Result<Value> {
        self.frozen.value(name)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.frozen.get(name)
    }

    pub fn identity(&self) -> Result<Identity> {
        self.frozen.identity()
    }

    pub fn id(&self) -> Result<ID> {
        self.frozen.id()
    }

    pub fn len(&self) -> usize {
        self.frozen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frozen.is_empty()
    }

    /// The current snapshot.
    pub fn frozen(&self) -> &FrozenMap {
        &self.frozen
    }

    pub fn freeze(self) -> FrozenMap {
        self.frozen
    }
}

impl From<FrozenMap> for Map {
    fn from(frozen: FrozenMap) -> Self {
        Self { frozen }
    }
}

impl From<Map> for FrozenMap {
    fn from(map: Map) -> Self {
        map.frozen
    }
}

impl std::fmt::Display for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.frozen, f)
    }
}
