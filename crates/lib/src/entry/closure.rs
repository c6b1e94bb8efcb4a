//! Bound function applications.

use std::rc::Rc;

use crate::{
    Result,
    entry::{Entry, memo::Memo},
    function::{Appliable, Args, FunctionError, Param},
    identity::{Identifiable, Identity},
    value::Value,
};

/// What a closure calls once its arguments are ready.
#[derive(Clone)]
pub(crate) enum BoundCallee {
    Function(Rc<dyn Appliable>),
    /// A function stored as another entry's value, with the parameters it
    /// was bound against.
    Entry { entry: Entry, params: Vec<Param> },
}

impl BoundCallee {
    fn identity(&self) -> Identity {
        match self {
            BoundCallee::Function(function) => function.identity(),
            BoundCallee::Entry { entry, .. } => entry.identity(),
        }
    }
}

/// Argument entries of a closure, one per parameter in declaration order.
#[derive(Clone)]
pub(crate) struct BoundArgs(pub(crate) Vec<(String, Entry)>);

impl BoundArgs {
    fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.0.iter().map(|(_, entry)| entry)
    }
}

/// A function application bound against a map snapshot.
///
/// Its identity is `id(arg_1) * ... * id(arg_k) * reverse(id(callee))`. The
/// value is computed on first access and memoized.
pub struct Closure {
    label: String,
    callee: BoundCallee,
    args: BoundArgs,
    identity: Identity,
    memo: Memo,
}

impl Closure {
    pub(crate) fn new(label: impl Into<String>, callee: BoundCallee, args: BoundArgs) -> Self {
        let identity = args
            .entries()
            .fold(Identity::ZERO, |acc, entry| acc * entry.identity())
            * callee.identity().reverse();
        Self {
            label: label.into(),
            callee,
            args,
            identity,
            memo: Memo::new(),
        }
    }

    /// Name of the applied function, or of the field holding it.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_evaluated(&self) -> bool {
        self.memo.is_evaluated()
    }

    pub(crate) fn peek(&self) -> Option<Value> {
        self.memo.get()
    }

    /// Value of the application, computed at most once.
    pub fn value(&self) -> Result<Value> {
        self.memo.get_or_try_init(|| self.compute())
    }

    /// Entries this closure reads, in evaluation order.
    pub fn dependencies(&self) -> Vec<Entry> {
        self.args.entries().cloned().collect()
    }

    fn compute(&self) -> Result<Value> {
        let function = match &self.callee {
            BoundCallee::Function(function) => function.clone(),
            BoundCallee::Entry { entry, params } => match entry.value()? {
                Value::Function(function) => {
                    check_signature(&*function, params)?;
                    function
                }
                other => {
                    return Err(FunctionError::NotCallable {
                        found: other.type_name(),
                    }
                    .into());
                }
            },
        };

        let values = self
            .args
            .0
            .iter()
            .map(|(name, entry)| Ok((name.clone(), entry.value()?)))
            .collect::<Result<Vec<_>>>()?;

        tracing::trace!(function = function.name(), id = %self.identity, "evaluating closure");
        function.call(&Args::new(function.name(), values))
    }
}

/// Fail unless `function` declares exactly `params`, defaults included.
pub(crate) fn check_signature(function: &dyn Appliable, params: &[Param]) -> Result<()> {
    if function.params() == params {
        return Ok(());
    }
    Err(FunctionError::SignatureMismatch {
        function: function.name().to_string(),
        declared: describe(params),
        actual: describe(function.params()),
    }
    .into())
}

fn describe(params: &[Param]) -> String {
    let names: Vec<String> = params
        .iter()
        .map(|param| match param.default() {
            Some(default) => format!("{}={default}", param.name()),
            None => param.name().to_string(),
        })
        .collect();
    format!("({})", names.join(", "))
}

impl Identifiable for Closure {
    fn identity(&self) -> Identity {
        self.identity
    }
}

impl std::fmt::Debug for Closure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Closure")
            .field("label", &self.label)
            .field("identity", &self.identity)
            .field("evaluated", &self.is_evaluated())
            .finish()
    }
}
