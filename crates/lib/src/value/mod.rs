//! Values stored in, and computed by, a map.
//!
//! A [`Value`] is the payload of an entry. Its identity is derived from a
//! canonical, type-tagged encoding, except for nested maps and functions which
//! contribute their own identities. Nested maps are opaque: they are never
//! expanded into the enclosing map.

mod errors;

pub use errors::ValueError;

use std::cmp::Ordering;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    Result,
    constants::VALUE_DOMAIN,
    function::Appliable,
    identity::Identity,
    map::FrozenMap,
};

/// The payload of an entry.
///
/// Dicts keep their insertion order; use [`Value::canonical_cmp`] when a
/// sorted order is needed. `Map` and `Function` are in-memory only and are
/// never persisted as payloads.
#[derive(Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(#[serde(with = "serde_bytes")] Vec<u8>),
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    #[serde(skip)]
    Map(FrozenMap),
    #[serde(skip)]
    Function(Rc<dyn Appliable>),
}

impl Value {
    /// Build a bytes value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Build a dict from key/value pairs, keeping their order.
    pub fn dict<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Dict(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Name of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
            Value::Map(_) => "map",
            Value::Function(_) => "function",
        }
    }

    /// Identity of this value.
    ///
    /// Fails for values without a canonical encoding (non-finite floats) and
    /// for nested maps that are not ready.
    pub fn identity(&self) -> Result<Identity> {
        match self {
            Value::Map(map) => map.identity(),
            Value::Function(function) => Ok(function.identity()),
            other => {
                let encoded = serde_json::to_vec(&other.canonical()?).map_err(|e| {
                    ValueError::Serialization {
                        value: other.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Identity::digest(VALUE_DOMAIN, &[&encoded]))
            }
        }
    }

    /// Type-tagged structural encoding used for hashing.
    fn canonical(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => json!(["n"]),
            Value::Bool(b) => json!(["b", b]),
            Value::Int(i) => json!(["i", i]),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(ValueError::Serialization {
                        value: self.to_string(),
                        reason: "non-finite floats have no canonical encoding".to_string(),
                    }
                    .into());
                }
                // -0.0 == 0.0, so both must hash alike.
                let f = if *f == 0.0 { 0.0 } else { *f };
                json!(["f", f])
            }
            Value::Text(s) => json!(["s", s]),
            Value::Bytes(b) => json!(["x", hex::encode(b)]),
            Value::List(items) => {
                let items = items
                    .iter()
                    .map(Value::canonical)
                    .collect::<Result<Vec<_>>>()?;
                json!(["l", items])
            }
            Value::Dict(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(k, v)| Ok(json!([k.canonical()?, v.canonical()?])))
                    .collect::<Result<Vec<_>>>()?;
                json!(["d", pairs])
            }
            Value::Map(map) => json!(["m", map.id()?.as_str()]),
            Value::Function(function) => json!(["F", function.id().as_str()]),
        })
    }

    /// Total order used wherever keys must be sorted.
    ///
    /// Values are ranked by kind first; ints and floats compare numerically
    /// with each other.
    pub fn canonical_cmp(&self, other: &Value) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int(_) | Value::Float(_) => 2,
                Value::Text(_) => 3,
                Value::Bytes(_) => 4,
                Value::List(_) => 5,
                Value::Dict(_) => 6,
                Value::Map(_) => 7,
                Value::Function(_) => 8,
            }
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.canonical_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Value::Dict(a), Value::Dict(b)) => a
                .iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.canonical_cmp(kb).then(va.canonical_cmp(vb)))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Value::Map(a), Value::Map(b)) => a.id().ok().cmp(&b.id().ok()),
            (Value::Function(a), Value::Function(b)) => a.id().cmp(&b.id()),
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }

    /// Look up a key in a dict value.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        match self {
            Value::Dict(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of elements of a list or dict.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(items.len()),
            Value::Dict(pairs) => Some(pairs.len()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; ints are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Dict(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FrozenMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Rc<dyn Appliable>> {
        match self {
            Value::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Like [`Value::as_i64`] but with a typed error.
    pub fn expect_i64(&self) -> Result<i64> {
        self.as_i64().ok_or_else(|| self.mismatch("int"))
    }

    /// Like [`Value::as_f64`] but with a typed error.
    pub fn expect_f64(&self) -> Result<f64> {
        self.as_f64().ok_or_else(|| self.mismatch("float"))
    }

    /// Like [`Value::as_str`] but with a typed error.
    pub fn expect_str(&self) -> Result<&str> {
        self.as_str().ok_or_else(|| self.mismatch("text"))
    }

    /// Like [`Value::as_list`] but with a typed error.
    pub fn expect_list(&self) -> Result<&[Value]> {
        self.as_list().ok_or_else(|| self.mismatch("list"))
    }

    fn mismatch(&self, expected: &'static str) -> crate::Error {
        ValueError::TypeMismatch {
            expected,
            actual: self.type_name(),
        }
        .into()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b'{}'", hex::encode(b)),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Map(map) => match map.id() {
                Ok(id) => write!(f, "<map {}>", id.short()),
                Err(_) => write!(f, "<map unready>"),
            },
            Value::Function(function) => write!(f, "<fn {}>", function.name()),
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            other => write!(f, "{}({other})", other.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<FrozenMap> for Value {
    fn from(map: FrozenMap) -> Self {
        Value::Map(map)
    }
}

impl From<Rc<dyn Appliable>> for Value {
    fn from(function: Rc<dyn Appliable>) -> Self {
        Value::Function(function)
    }
}

impl From<crate::Function> for Value {
    fn from(function: crate::Function) -> Self {
        Value::Function(Rc::new(function))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
