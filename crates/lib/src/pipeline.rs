//! Deferred pipelines of map-building steps.
//!
//! An [`Expr`] is a flat list of steps: maps, batches, applications with a
//! declared output, and cache directives. Nothing is resolved until
//! [`Expr::solve`] folds the steps left to right into one [`FrozenMap`].
//! Pending random draws can be fixed beforehand with [`Expr::sample`].

use std::ops::Shr;
use std::rc::Rc;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Result,
    argument::{Application, Batch},
    map::{FrozenMap, Map, MapError},
    store::Store,
};

/// Replace fields by store-backed entries when the pipeline is solved.
#[derive(Clone)]
pub struct CacheDirective {
    store: Rc<dyn Store>,
    fields: Vec<String>,
}

impl CacheDirective {
    /// Cache the named fields, or every unevaluated field if `fields` is empty.
    pub fn new<S: Into<String>>(store: &Rc<dyn Store>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            store: store.clone(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl std::fmt::Debug for CacheDirective {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDirective")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`CacheDirective::new`].
pub fn cache<S: Into<String>>(
    store: &Rc<dyn Store>,
    fields: impl IntoIterator<Item = S>,
) -> CacheDirective {
    CacheDirective::new(store, fields)
}

/// One step of a pipeline.
#[derive(Debug, Clone)]
pub enum Step {
    Map(FrozenMap),
    Batch(Batch),
    Apply(Application),
    Cache(CacheDirective),
}

impl Step {
    fn kind(&self) -> &'static str {
        match self {
            Step::Map(_) => "map",
            Step::Batch(_) => "batch",
            Step::Apply(_) => "apply",
            Step::Cache(_) => "cache",
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Step> {
        Ok(match self {
            Step::Map(map) => Step::Map(map.sample(rng)?),
            Step::Batch(batch) => Step::Batch(batch.sample(rng)),
            Step::Apply(app) => Step::Apply(app.sample(rng)),
            Step::Cache(directive) => Step::Cache(directive.clone()),
        })
    }

    /// Fold this step into `map`.
    fn reduce(&self, map: &FrozenMap) -> Result<FrozenMap> {
        match self {
            Step::Map(other) => map.merge_map(other),
            Step::Batch(batch) => map.merge(batch.clone()),
            Step::Apply(app) => map.apply(app.clone()),
            Step::Cache(directive) => map.cached(&directive.store, &directive.fields),
        }
    }
}

/// A deferred sequence of steps.
///
/// # Example
///
/// ```
/// use idmap::{Application, Batch, Function, Value};
///
/// let double = Function::new("double", ["x"], |args| Ok(Value::Int(args.i64("x")? * 2)));
/// let expr = Batch::new().with("x", 4) >> Application::new(double).output("y").unwrap();
/// let map = expr.solve().unwrap();
/// assert_eq!(map.value("y").unwrap(), Value::Int(8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Expr {
    steps: Vec<Step>,
}

impl Expr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step or splice in another expression.
    pub fn then(mut self, next: impl Into<Expr>) -> Self {
        self.steps.extend(next.into().steps);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve every pending draw with a generator seeded by `seed`.
    pub fn sample(&self, seed: u64) -> Result<Expr> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.sample_with(&mut rng)
    }

    /// Resolve every pending draw with `rng`, step by step.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Expr> {
        let steps = self
            .steps
            .iter()
            .map(|step| step.sample(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Expr { steps })
    }

    /// Check the pipeline shape before folding it.
    fn validate(&self) -> Result<()> {
        let Some(first) = self.steps.first() else {
            return Err(MapError::usage("cannot solve an empty pipeline").into());
        };
        if !matches!(first, Step::Map(_) | Step::Batch(_)) {
            return Err(MapError::usage(format!(
                "a pipeline must start with a map, not a {} step",
                first.kind()
            ))
            .into());
        }
        for step in &self.steps {
            if let Step::Apply(app) = step {
                if app.target().is_none() {
                    return Err(MapError::usage(format!(
                        "{}() in a pipeline needs output fields",
                        app.callee().name()
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Fold the steps left to right into one map.
    pub fn solve(&self) -> Result<FrozenMap> {
        self.validate()?;
        let mut steps = self.steps.iter();
        let mut map = match steps.next() {
            Some(Step::Map(map)) => map.clone(),
            Some(Step::Batch(batch)) => FrozenMap::from_batch(batch.clone())?,
            _ => return Err(MapError::usage("a pipeline must start with a map").into()),
        };
        for step in steps {
            map = step.reduce(&map)?;
            tracing::debug!(step = step.kind(), fields = map.len(), "reduced pipeline step");
        }
        Ok(map)
    }
}

impl From<Step> for Expr {
    fn from(step: Step) -> Self {
        Expr { steps: vec![step] }
    }
}

impl From<FrozenMap> for Expr {
    fn from(map: FrozenMap) -> Self {
        Step::Map(map).into()
    }
}

impl From<Map> for Expr {
    fn from(map: Map) -> Self {
        Step::Map(map.freeze()).into()
    }
}

impl From<Batch> for Expr {
    fn from(batch: Batch) -> Self {
        Step::Batch(batch).into()
    }
}

impl From<Application> for Expr {
    fn from(app: Application) -> Self {
        Step::Apply(app).into()
    }
}

impl From<CacheDirective> for Expr {
    fn from(directive: CacheDirective) -> Self {
        Step::Cache(directive).into()
    }
}

macro_rules! impl_shr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl<R: Into<Expr>> Shr<R> for $ty {
                type Output = Expr;

                fn shr(self, rhs: R) -> Expr {
                    Expr::from(self).then(rhs)
                }
            }
        )*
    };
}

impl_shr!(Expr, FrozenMap, Map, Batch, Application, CacheDirective);
