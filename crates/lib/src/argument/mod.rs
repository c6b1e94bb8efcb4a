//! Inputs to map building.
//!
//! An [`Argument`] is anything that can be placed in a map or passed to a
//! function: a concrete value, a reference to another field, a default, a
//! pending random draw, or a deferred [`Application`]. Arguments are never
//! stored in a map directly; the map builder resolves them into entries.

mod batch;
mod sample;
mod target;

pub use batch::Batch;
pub use sample::{Progression, Sample};
pub use target::Target;

use std::collections::BTreeMap;
use std::rc::Rc;

use rand::Rng;

use crate::{
    Function, Result,
    function::{Appliable, Param},
    map::{FrozenMap, MapError},
    value::Value,
};

/// An input slot of a map item or a function application.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Reference to the entry stored under a field name.
    Field(String),
    /// A concrete value.
    Value(Value),
    /// A fallback value for an omitted parameter.
    Default(Value),
    /// A value still to be drawn.
    Sample(Sample),
    /// A deferred function call.
    Apply(Application),
}

impl Argument {
    pub fn field(name: impl Into<String>) -> Self {
        Argument::Field(name.into())
    }

    pub fn value(value: impl Into<Value>) -> Self {
        Argument::Value(value.into())
    }

    pub fn default(value: impl Into<Value>) -> Self {
        Argument::Default(value.into())
    }

    /// Whether this argument still holds an unresolved draw.
    pub fn is_sampleable(&self) -> bool {
        match self {
            Argument::Sample(_) => true,
            Argument::Apply(app) => app.is_sampleable(),
            _ => false,
        }
    }

    /// Resolve every draw with `rng`, leaving everything else untouched.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Argument {
        match self {
            Argument::Sample(sample) => Argument::Value(sample.draw(rng)),
            Argument::Apply(app) => Argument::Apply(app.sample(rng)),
            other => other.clone(),
        }
    }

    /// Field names this argument refers to, including those of nested applications.
    pub fn fields(&self) -> Vec<String> {
        match self {
            Argument::Field(name) => vec![name.clone()],
            Argument::Apply(app) => app.fields(),
            _ => Vec::new(),
        }
    }
}

macro_rules! argument_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::Value(value.into())
                }
            }
        )*
    };
}

argument_from_value!(
    Value,
    bool,
    i64,
    i32,
    usize,
    f64,
    &str,
    String,
    Vec<Value>,
    FrozenMap,
    Function,
);

impl From<Sample> for Argument {
    fn from(sample: Sample) -> Self {
        Argument::Sample(sample)
    }
}

impl From<Application> for Argument {
    fn from(app: Application) -> Self {
        Argument::Apply(app)
    }
}

/// What an application calls.
#[derive(Clone)]
pub enum Callee {
    /// A callable given directly.
    Function(Rc<dyn Appliable>),
    /// A callable stored as the value of another field.
    Field(String),
}

impl Callee {
    pub fn field(name: impl Into<String>) -> Self {
        Callee::Field(name.into())
    }

    /// Name for messages.
    pub fn name(&self) -> &str {
        match self {
            Callee::Function(f) => f.name(),
            Callee::Field(name) => name,
        }
    }
}

impl PartialEq for Callee {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callee::Function(a), Callee::Function(b)) => a.identity() == b.identity(),
            (Callee::Field(a), Callee::Field(b)) => a == b,
            _ => false,
        }
    }
}

impl std::fmt::Debug for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Function(function) => write!(f, "Function({})", function.name()),
            Callee::Field(name) => write!(f, "Field({name})"),
        }
    }
}

impl From<Function> for Callee {
    fn from(function: Function) -> Self {
        Callee::Function(Rc::new(function))
    }
}

impl From<Rc<dyn Appliable>> for Callee {
    fn from(function: Rc<dyn Appliable>) -> Self {
        Callee::Function(function)
    }
}

/// A deferred call over named arguments.
///
/// Parameters the caller leaves out fall back to their declared default, or
/// else read the field of the same name. The output fields are declared with
/// [`Application::output`] before the application is merged into a map.
///
/// A callee read from a field that is itself computed has no parameter list
/// until it runs; such applications declare one with
/// [`Application::with_signature`], and the function produced must match it.
///
/// # Example
///
/// ```
/// use idmap::{Application, Argument, Function, Value};
///
/// let add = Function::new("add", ["a", "b"], |args| {
///     Ok(Value::Int(args.i64("a")? + args.i64("b")?))
/// });
/// let app = Application::new(add)
///     .arg(Argument::field("x"))
///     .kwarg("b", 4)
///     .output("z")
///     .unwrap();
/// assert_eq!(app.target().unwrap().names(), vec!["z"]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    callee: Callee,
    args: Vec<Argument>,
    kwargs: BTreeMap<String, Argument>,
    signature: Option<Vec<Param>>,
    output: Option<Target>,
}

impl Application {
    pub fn new(callee: impl Into<Callee>) -> Self {
        Self {
            callee: callee.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
            signature: None,
            output: None,
        }
    }

    /// Declare the parameters of the callee.
    ///
    /// Required when the callee field holds a computed function; checked
    /// against the function when it is known.
    pub fn with_signature<P: Into<Param>>(mut self, params: impl IntoIterator<Item = P>) -> Self {
        self.signature = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Append a positional argument.
    pub fn arg(mut self, arg: impl Into<Argument>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, arg: impl Into<Argument>) -> Self {
        self.kwargs.insert(name.into(), arg.into());
        self
    }

    /// Declare the output field(s). An application can be bound only once.
    pub fn output(mut self, target: impl Into<Target>) -> Result<Self> {
        if let Some(existing) = &self.output {
            return Err(MapError::usage(format!(
                "{}() is already bound to {existing}",
                self.callee.name()
            ))
            .into());
        }
        self.output = Some(target.into());
        Ok(self)
    }

    /// Declare several outputs, accepting the `target=source` renaming form.
    pub fn outputs<S: AsRef<str>>(self, names: impl IntoIterator<Item = S>) -> Result<Self> {
        let target = Target::parse(names)?;
        self.output(target)
    }

    pub fn callee(&self) -> &Callee {
        &self.callee
    }

    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Argument> {
        &self.kwargs
    }

    pub fn target(&self) -> Option<&Target> {
        self.output.as_ref()
    }

    pub fn signature(&self) -> Option<&[Param]> {
        self.signature.as_deref()
    }

    /// Split off the declared output.
    pub(crate) fn into_parts(self) -> (Option<Target>, Application) {
        let Application {
            callee,
            args,
            kwargs,
            signature,
            output,
        } = self;
        (
            output,
            Application {
                callee,
                args,
                kwargs,
                signature,
                output: None,
            },
        )
    }

    pub fn is_sampleable(&self) -> bool {
        self.args.iter().any(Argument::is_sampleable)
            || self.kwargs.values().any(Argument::is_sampleable)
    }

    /// Resolve every draw in the arguments with `rng`, in canonical order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Application {
        Application {
            callee: self.callee.clone(),
            args: self.args.iter().map(|a| a.sample(rng)).collect(),
            kwargs: self
                .kwargs
                .iter()
                .map(|(k, a)| (k.clone(), a.sample(rng)))
                .collect(),
            signature: self.signature.clone(),
            output: self.output.clone(),
        }
    }

    /// Field names referenced by the callee and the explicit arguments.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if let Callee::Field(name) = &self.callee {
            fields.push(name.clone());
        }
        for arg in self.args.iter().chain(self.kwargs.values()) {
            fields.extend(arg.fields());
        }
        fields
    }
}
