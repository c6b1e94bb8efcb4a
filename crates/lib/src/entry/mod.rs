//!
//! Defines the slots stored in a map (`Entry`) and their variants.
//!
//! An `Entry` is the resolved, identity-bearing content of one field. It is
//! either a concrete value, a lazily evaluated [`Closure`], a [`SubEntry`]
//! selecting one output of a multi-output computation, or a [`Cached`]
//! placeholder backed by a store. Entries are reference counted, so merging
//! maps shares them along with their memoized values.

mod cached;
mod closure;
pub(crate) mod memo;

pub use cached::Cached;
pub use closure::Closure;
pub(crate) use closure::{BoundArgs, BoundCallee, check_signature};

use std::rc::Rc;

use crate::{
    Result,
    identity::{Identifiable, Identity},
    map::MapError,
    value::Value,
};
use memo::Memo;

/// The resolved content of a map field.
#[derive(Clone)]
pub enum Entry {
    Concrete(Rc<Concrete>),
    Closure(Rc<Closure>),
    Sub(Rc<SubEntry>),
    Cached(Rc<Cached>),
}

impl Entry {
    /// Wrap a known value, deriving its identity from the value.
    pub fn concrete(value: impl Into<Value>) -> Result<Entry> {
        Ok(Entry::Concrete(Rc::new(Concrete::new(value.into())?)))
    }

    /// The value of this entry, computing or fetching it on first access.
    pub fn value(&self) -> Result<Value> {
        match self {
            Entry::Concrete(c) => Ok(c.value().clone()),
            Entry::Closure(c) => c.value(),
            Entry::Sub(s) => s.value(),
            Entry::Cached(c) => c.value(),
        }
    }

    /// Whether reading the value would return without computing anything.
    pub fn is_evaluated(&self) -> bool {
        match self {
            Entry::Concrete(_) => true,
            Entry::Closure(c) => c.is_evaluated(),
            Entry::Sub(s) => s.is_evaluated(),
            Entry::Cached(c) => c.is_evaluated(),
        }
    }

    /// The value if it is already available.
    pub fn peek(&self) -> Option<Value> {
        match self {
            Entry::Concrete(c) => Some(c.value().clone()),
            Entry::Closure(c) => c.peek(),
            Entry::Sub(s) => s.memo.get(),
            Entry::Cached(c) => c.peek(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Concrete(_) => "concrete",
            Entry::Closure(_) => "closure",
            Entry::Sub(_) => "sub",
            Entry::Cached(_) => "cached",
        }
    }

    /// Whether both handles point at the same entry object.
    pub fn ptr_eq(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Concrete(a), Entry::Concrete(b)) => Rc::ptr_eq(a, b),
            (Entry::Closure(a), Entry::Closure(b)) => Rc::ptr_eq(a, b),
            (Entry::Sub(a), Entry::Sub(b)) => Rc::ptr_eq(a, b),
            (Entry::Cached(a), Entry::Cached(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Identifiable for Entry {
    fn identity(&self) -> Identity {
        match self {
            Entry::Concrete(c) => c.identity,
            Entry::Closure(c) => c.identity(),
            Entry::Sub(s) => s.identity,
            Entry::Cached(c) => c.identity(),
        }
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Concrete(c) => std::fmt::Debug::fmt(c, f),
            Entry::Closure(c) => std::fmt::Debug::fmt(c, f),
            Entry::Sub(s) => std::fmt::Debug::fmt(s, f),
            Entry::Cached(c) => std::fmt::Debug::fmt(c, f),
        }
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.peek() {
            Some(value) => write!(f, "{value}"),
            None => match self {
                Entry::Closure(c) => write!(f, "<{} {}>", c.label(), self.id().short()),
                other => write!(f, "<{} {}>", other.kind(), other.id().short()),
            },
        }
    }
}

/// An entry holding a known value.
#[derive(Debug)]
pub struct Concrete {
    value: Value,
    identity: Identity,
}

impl Concrete {
    pub fn new(value: Value) -> Result<Self> {
        let identity = value.identity()?;
        Ok(Self { value, identity })
    }

    /// Wrap a value whose identity is already known, e.g. when loading from a store.
    pub fn with_identity(value: Value, identity: Identity) -> Self {
        Self { value, identity }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// One output of a multi-output computation.
///
/// Selects element `index` of a list result, or from a dict result either the
/// value under `source_key` or the `index`-th value in sorted key order.
pub struct SubEntry {
    parent: Entry,
    index: usize,
    total: usize,
    source_key: Option<Value>,
    identity: Identity,
    memo: Memo,
}

impl SubEntry {
    pub(crate) fn new(parent: Entry, index: usize, total: usize, source_key: Option<Value>) -> Self {
        let identity = parent.identity().subrange(index, total);
        Self {
            parent,
            index,
            total,
            source_key,
            identity,
            memo: Memo::new(),
        }
    }

    pub fn parent(&self) -> &Entry {
        &self.parent
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn source_key(&self) -> Option<&Value> {
        self.source_key.as_ref()
    }

    pub fn is_evaluated(&self) -> bool {
        self.memo.is_evaluated()
    }

    pub fn value(&self) -> Result<Value> {
        self.memo
            .get_or_try_init(|| self.select(&self.parent.value()?))
    }

    fn select(&self, result: &Value) -> Result<Value> {
        let actual = result.len().ok_or_else(|| {
            MapError::usage(format!("cannot unpack a {} result", result.type_name()))
        })?;
        if actual != self.total {
            return Err(MapError::Cardinality {
                expected: self.total,
                actual,
            }
            .into());
        }

        match (result, &self.source_key) {
            (Value::List(items), None) => Ok(items[self.index].clone()),
            (Value::Dict(_), Some(key)) => result.get(key).cloned().ok_or_else(|| {
                MapError::usage(format!("result has no output key {key}")).into()
            }),
            (Value::Dict(pairs), None) => {
                let mut sorted: Vec<&(Value, Value)> = pairs.iter().collect();
                sorted.sort_by(|(a, _), (b, _)| a.canonical_cmp(b));
                Ok(sorted[self.index].1.clone())
            }
            (other, Some(_)) => Err(MapError::usage(format!(
                "renamed outputs need a dict result, got {}",
                other.type_name()
            ))
            .into()),
            // `len()` only succeeds for lists and dicts.
            (other, None) => Err(MapError::usage(format!(
                "cannot unpack a {} result",
                other.type_name()
            ))
            .into()),
        }
    }
}

impl std::fmt::Debug for SubEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubEntry")
            .field("index", &self.index)
            .field("total", &self.total)
            .field("source_key", &self.source_key)
            .field("identity", &self.identity)
            .finish()
    }
}
