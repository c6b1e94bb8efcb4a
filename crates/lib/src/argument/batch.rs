//! Ordered batches of named items, the plain-mapping step of a pipeline.

use rand::Rng;

use crate::{
    Result,
    argument::{Application, Argument, Target},
    map::MapError,
};

/// An ordered list of `(target, item)` pairs merged into a map in one go.
///
/// Items inside one batch may reference each other in any order.
///
/// # Example
///
/// ```
/// use idmap::{Argument, Batch, FrozenMap, Value};
///
/// let map = FrozenMap::from_batch(
///     Batch::new()
///         .with("y", Argument::field("x"))
///         .with("x", 5),
/// )
/// .unwrap();
/// assert_eq!(map.value("y").unwrap(), Value::Int(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    items: Vec<(Target, Argument)>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, builder style.
    pub fn with(mut self, target: impl Into<Target>, item: impl Into<Argument>) -> Self {
        self.push(target, item);
        self
    }

    pub fn push(&mut self, target: impl Into<Target>, item: impl Into<Argument>) {
        self.items.push((target.into(), item.into()));
    }

    /// Add an application under its own declared output.
    pub fn apply(mut self, app: Application) -> Result<Self> {
        let (target, app) = app.into_parts();
        let Some(target) = target else {
            return Err(MapError::usage(format!(
                "{}() has no output fields; call output() first",
                app.callee().name()
            ))
            .into());
        };
        self.items.push((target, Argument::Apply(app)));
        Ok(self)
    }

    pub fn items(&self) -> &[(Target, Argument)] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_sampleable(&self) -> bool {
        self.items.iter().any(|(_, item)| item.is_sampleable())
    }

    /// Resolve every draw with `rng`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Batch {
        Batch {
            items: self
                .items
                .iter()
                .map(|(target, item)| (target.clone(), item.sample(rng)))
                .collect(),
        }
    }
}

impl IntoIterator for Batch {
    type Item = (Target, Argument);
    type IntoIter = std::vec::IntoIter<(Target, Argument)>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Into<Target>, A: Into<Argument>> FromIterator<(T, A)> for Batch {
    fn from_iter<I: IntoIterator<Item = (T, A)>>(iter: I) -> Self {
        Batch {
            items: iter
                .into_iter()
                .map(|(t, a)| (t.into(), a.into()))
                .collect(),
        }
    }
}
