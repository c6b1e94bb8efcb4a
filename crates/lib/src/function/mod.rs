//! Callables that can be applied inside a map.
//!
//! Anything applied by a closure implements [`Appliable`], which pairs a
//! parameter list with an explicit [`Identity`]. [`Function`] is the stock
//! implementation wrapping a Rust closure.

mod errors;

pub use errors::FunctionError;

use std::rc::Rc;

use crate::{
    Result,
    identity::{Identifiable, Identity},
    value::Value,
};

/// A declared parameter, optionally with a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Param::new(name)
    }
}

/// Capability of a callable that can be applied inside a map.
///
/// The identity must change whenever the behaviour of the callable changes;
/// two callables with the same identity are assumed interchangeable.
pub trait Appliable: Identifiable {
    /// Name used in messages and debug output.
    fn name(&self) -> &str;

    /// Declared parameters in declaration order.
    fn params(&self) -> &[Param];

    /// Invoke the callable with arguments already bound to its parameters.
    fn call(&self, args: &Args) -> Result<Value>;
}

type Body = dyn Fn(&Args) -> Result<Value>;

/// A named Rust closure with a parameter list and an identity.
///
/// By default the identity is derived from the name and parameter names.
/// Use [`Function::with_version`] or [`Function::with_identity`] to tell apart
/// two functions that share a signature but compute different things.
///
/// # Example
///
/// ```
/// use idmap::{Appliable, Function, Value};
///
/// let add = Function::new("add", ["a", "b"], |args| {
///     Ok(Value::Int(args.i64("a")? + args.i64("b")?))
/// });
/// assert_eq!(add.params().len(), 2);
/// ```
#[derive(Clone)]
pub struct Function {
    name: String,
    params: Vec<Param>,
    identity: Identity,
    body: Rc<Body>,
}

impl Function {
    pub fn new<P, F>(name: impl Into<String>, params: impl IntoIterator<Item = P>, body: F) -> Self
    where
        P: Into<Param>,
        F: Fn(&Args) -> Result<Value> + 'static,
    {
        let name = name.into();
        let params: Vec<Param> = params.into_iter().map(Into::into).collect();
        let identity = Identity::of_function(&Self::descriptor(&name, &params, None));
        Self {
            name,
            params,
            identity,
            body: Rc::new(body),
        }
    }

    /// Mix a version tag into the identity.
    pub fn with_version(mut self, version: &str) -> Self {
        self.identity = Identity::of_function(&Self::descriptor(&self.name, &self.params, Some(version)));
        self
    }

    /// Replace the identity outright.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    fn descriptor(name: &str, params: &[Param], version: Option<&str>) -> String {
        let names: Vec<&str> = params.iter().map(Param::name).collect();
        match version {
            Some(version) => format!("{name}({})@{version}", names.join(",")),
            None => format!("{name}({})", names.join(",")),
        }
    }
}

impl Identifiable for Function {
    fn identity(&self) -> Identity {
        self.identity
    }
}

impl Appliable for Function {
    fn name(&self) -> &str {
        &self.name
    }

    fn params(&self) -> &[Param] {
        &self.params
    }

    fn call(&self, args: &Args) -> Result<Value> {
        (self.body)(args)
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Arguments handed to a callable, bound to parameter names in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Args {
    function: String,
    values: Vec<(String, Value)>,
}

impl Args {
    pub(crate) fn new(function: impl Into<String>, values: Vec<(String, Value)>) -> Self {
        Self {
            function: function.into(),
            values,
        }
    }

    /// Argument by parameter name.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
            .ok_or_else(|| {
                FunctionError::MissingArgument {
                    function: self.function.clone(),
                    param: name.to_string(),
                }
                .into()
            })
    }

    /// Argument by position.
    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index).map(|(_, value)| value)
    }

    pub fn i64(&self, name: &str) -> Result<i64> {
        self.get(name)?.expect_i64()
    }

    pub fn f64(&self, name: &str) -> Result<f64> {
        self.get(name)?.expect_f64()
    }

    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)?.expect_str()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

/// Match supplied arguments against a parameter list.
///
/// Returns one slot per declared parameter, in declaration order, holding the
/// supplied argument if any. Callers decide how to fill the empty slots.
pub(crate) fn bind_params<T>(
    function: &str,
    params: &[Param],
    positional: Vec<T>,
    named: Vec<(String, T)>,
) -> Result<Vec<(Param, Option<T>)>> {
    if positional.len() > params.len() {
        return Err(FunctionError::Arity {
            function: function.to_string(),
            expected: params.len(),
            got: positional.len(),
        }
        .into());
    }

    let mut slots: Vec<(Param, Option<T>)> =
        params.iter().cloned().map(|param| (param, None)).collect();
    for (slot, arg) in slots.iter_mut().zip(positional) {
        slot.1 = Some(arg);
    }
    for (name, arg) in named {
        let Some(slot) = slots.iter_mut().find(|(param, _)| param.name() == name) else {
            return Err(FunctionError::UnknownParameter {
                function: function.to_string(),
                param: name,
            }
            .into());
        };
        if slot.1.is_some() {
            return Err(FunctionError::DuplicateArgument {
                function: function.to_string(),
                param: name,
            }
            .into());
        }
        slot.1 = Some(arg);
    }
    Ok(slots)
}
