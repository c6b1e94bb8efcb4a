//! Two-phase resolution of map items into slots.
//!
//! Items are installed one by one against the slots built so far. A field
//! reference to a name that does not exist yet installs a `Missing`
//! placeholder and leaves the referring item `Delayed`. Once every item of a
//! batch is installed, delayed items are re-resolved until nothing changes,
//! and whatever still waits on another waiting field is reported as a cycle.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    Result,
    argument::{Application, Argument, Callee, Target},
    entry::{BoundArgs, BoundCallee, Closure, Entry, check_signature},
    function::{FunctionError, Param, bind_params},
    identity::Identifiable,
    map::{FrozenMap, MapError, Pending, Slot, expand::expand, validate_name},
    value::Value,
};

/// Outcome of resolving one argument against the current slots.
enum Resolution {
    Ready(Entry),
    /// Waiting on the listed fields.
    Blocked(Vec<String>),
}

pub(crate) struct Builder {
    slots: IndexMap<String, Slot>,
    waiting: HashMap<String, Vec<String>>,
    /// Fields written during this build; these may be overwritten freely.
    touched: HashSet<String>,
    /// Unready fields the caller is allowed to fill.
    ignore: HashSet<String>,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            slots: IndexMap::new(),
            waiting: HashMap::new(),
            touched: HashSet::new(),
            ignore: HashSet::new(),
        }
    }

    /// Start from the raw slots of an existing map.
    pub(crate) fn from_map(map: &FrozenMap) -> Self {
        Self {
            slots: map.inner.slots.clone(),
            waiting: map.inner.waiting.clone(),
            touched: HashSet::new(),
            ignore: HashSet::new(),
        }
    }

    pub(crate) fn ignoring(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.ignore.extend(names);
        self
    }

    #[cfg(test)]
    fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Install one item under `target`.
    pub(crate) fn install(&mut self, target: Target, item: Argument) -> Result<()> {
        let names: Vec<String> = target.names().into_iter().map(str::to_string).collect();
        for name in &names {
            validate_name(name)?;
        }
        if let Argument::Apply(app) = &item {
            if app.target().is_some() {
                return Err(MapError::ConflictingOutput {
                    field: target.to_string(),
                }
                .into());
            }
        }
        for name in &names {
            self.check_overwrite(name)?;
        }

        for name in &names {
            self.touched.insert(name.clone());
            // Keep batch order for new names; a reference to the item's own
            // target resolves to this placeholder, not to a later value.
            if !self.slots.contains_key(name) {
                self.slots.insert(name.clone(), Slot::Missing);
            }
        }

        let pending = Rc::new(Pending { target, item });
        self.place(&pending, false)?;
        Ok(())
    }

    /// Install an already resolved entry, e.g. from another map.
    pub(crate) fn insert_entry(&mut self, name: &str, entry: Entry) -> Result<()> {
        validate_name(name)?;
        self.check_overwrite(name)?;
        self.touched.insert(name.to_string());
        self.waiting.remove(name);
        self.slots.insert(name.to_string(), Slot::Ready(entry));
        Ok(())
    }

    /// Install a placeholder for a field referenced but not defined elsewhere.
    pub(crate) fn insert_missing(&mut self, name: &str) {
        if !self.slots.contains_key(name) {
            self.touched.insert(name.to_string());
            self.slots.insert(name.to_string(), Slot::Missing);
        }
    }

    /// Replace a ready entry in place.
    pub(crate) fn replace_entry(&mut self, name: &str, entry: Entry) {
        if let Some(slot) = self.slots.get_mut(name) {
            *slot = Slot::Ready(entry);
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Slot> {
        self.waiting.remove(name);
        self.slots.shift_remove(name)
    }

    fn check_overwrite(&self, name: &str) -> Result<()> {
        match self.slots.get(name) {
            None | Some(Slot::Ready(_)) => Ok(()),
            Some(_) if self.touched.contains(name) || self.ignore.contains(name) => Ok(()),
            Some(_) => Err(MapError::IllegalOverwrite {
                field: name.to_string(),
            }
            .into()),
        }
    }

    /// Resolve a pending item and write the result into its target slots.
    ///
    /// With `only_current`, slots that no longer hold this pending item are
    /// left alone. Returns whether the item became ready.
    fn place(&mut self, pending: &Rc<Pending>, only_current: bool) -> Result<bool> {
        let holds = |slots: &IndexMap<String, Slot>, name: &str| {
            !only_current
                || matches!(slots.get(name), Some(Slot::Delayed(p)) if Rc::ptr_eq(p, pending))
        };

        if pending.item.is_sampleable() {
            for name in pending.target.names() {
                if holds(&self.slots, name) {
                    self.waiting.remove(name);
                    self.slots
                        .insert(name.to_string(), Slot::Unsampled(pending.clone()));
                }
            }
            return Ok(false);
        }

        match self.resolve_argument(&pending.item)? {
            Resolution::Ready(entry) => {
                for (name, entry) in expand(&pending.target, entry)? {
                    if holds(&self.slots, &name) {
                        tracing::trace!(field = %name, id = %entry.id(), "resolved field");
                        self.waiting.remove(&name);
                        self.slots.insert(name, Slot::Ready(entry));
                    }
                }
                Ok(true)
            }
            Resolution::Blocked(blockers) => {
                for name in pending.target.names() {
                    if holds(&self.slots, name) {
                        self.waiting.insert(name.to_string(), blockers.clone());
                        self.slots
                            .insert(name.to_string(), Slot::Delayed(pending.clone()));
                    }
                }
                Ok(false)
            }
        }
    }

    fn lookup(&mut self, name: &str) -> Result<Resolution> {
        validate_name(name)?;
        match self.slots.get(name) {
            Some(Slot::Ready(entry)) => Ok(Resolution::Ready(entry.clone())),
            Some(_) => Ok(Resolution::Blocked(vec![name.to_string()])),
            None => {
                self.insert_missing(name);
                Ok(Resolution::Blocked(vec![name.to_string()]))
            }
        }
    }

    fn resolve_argument(&mut self, arg: &Argument) -> Result<Resolution> {
        match arg {
            Argument::Field(name) => self.lookup(name),
            Argument::Value(value) | Argument::Default(value) => {
                Ok(Resolution::Ready(concrete(value)?))
            }
            Argument::Sample(_) => {
                Err(MapError::usage("cannot bind a draw that has not been sampled").into())
            }
            Argument::Apply(app) => {
                if let Some(target) = app.target() {
                    return Err(MapError::usage(format!(
                        "nested application {}() cannot declare outputs ({target})",
                        app.callee().name()
                    ))
                    .into());
                }
                self.bind(app)
            }
        }
    }

    /// Bind an application against the current slots, producing a closure.
    ///
    /// Binding always goes through a parameter list: the function's own, or
    /// the signature declared on the application when the callee field holds
    /// a computed function. The closure identity therefore does not depend on
    /// whether the callee has been evaluated.
    fn bind(&mut self, app: &Application) -> Result<Resolution> {
        let mut blockers = Vec::new();

        let (label, callee, params) = match app.callee() {
            Callee::Function(function) => {
                if let Some(declared) = app.signature() {
                    check_signature(&**function, declared)?;
                }
                (
                    function.name().to_string(),
                    Some(BoundCallee::Function(function.clone())),
                    Some(function.params().to_vec()),
                )
            }
            Callee::Field(name) => match self.lookup(name)? {
                Resolution::Ready(entry) => {
                    let params = match &entry {
                        Entry::Concrete(concrete) => match concrete.value() {
                            Value::Function(function) => {
                                if let Some(declared) = app.signature() {
                                    check_signature(&**function, declared)?;
                                }
                                function.params().to_vec()
                            }
                            other => {
                                return Err(FunctionError::NotCallable {
                                    found: other.type_name(),
                                }
                                .into());
                            }
                        },
                        _ => match app.signature() {
                            Some(declared) => declared.to_vec(),
                            None => {
                                return Err(MapError::usage(format!(
                                    "'{name}' holds a computed function; declare its parameters with with_signature"
                                ))
                                .into());
                            }
                        },
                    };
                    let callee = BoundCallee::Entry {
                        entry,
                        params: params.clone(),
                    };
                    (name.clone(), Some(callee), Some(params))
                }
                Resolution::Blocked(names) => {
                    blockers.extend(names);
                    (name.clone(), None, app.signature().map(<[Param]>::to_vec))
                }
            },
        };

        let args = match &params {
            Some(params) => Some(self.bind_named(&label, params, app, &mut blockers)?),
            None => {
                self.collect_blockers(app, &mut blockers)?;
                None
            }
        };

        match (callee, args) {
            (Some(callee), Some(args)) if blockers.is_empty() => Ok(Resolution::Ready(
                Entry::Closure(Rc::new(Closure::new(label, callee, args))),
            )),
            _ => {
                let mut seen = HashSet::new();
                blockers.retain(|name| seen.insert(name.clone()));
                Ok(Resolution::Blocked(blockers))
            }
        }
    }

    /// Bind against a parameter list, in declaration order.
    ///
    /// Omitted parameters take their default, or else read the field of the
    /// same name.
    fn bind_named(
        &mut self,
        function: &str,
        params: &[Param],
        app: &Application,
        blockers: &mut Vec<String>,
    ) -> Result<BoundArgs> {
        let positional: Vec<&Argument> = app.args().iter().collect();
        let named: Vec<(String, &Argument)> = app
            .kwargs()
            .iter()
            .map(|(name, arg)| (name.clone(), arg))
            .collect();

        let mut bound = Vec::new();
        for (param, arg) in bind_params(function, params, positional, named)? {
            let resolution = match (arg, param.default()) {
                (Some(arg), _) => self.resolve_argument(arg)?,
                (None, Some(default)) => Resolution::Ready(concrete(default)?),
                (None, None) => self.lookup(param.name())?,
            };
            match resolution {
                Resolution::Ready(entry) => bound.push((param.name().to_string(), entry)),
                Resolution::Blocked(names) => blockers.extend(names),
            }
        }
        Ok(BoundArgs(bound))
    }

    /// Resolve the explicit arguments of an application whose callee is not
    /// known yet, only to register what they wait on.
    fn collect_blockers(&mut self, app: &Application, blockers: &mut Vec<String>) -> Result<()> {
        for arg in app.args().iter().chain(app.kwargs().values()) {
            if let Resolution::Blocked(names) = self.resolve_argument(arg)? {
                blockers.extend(names);
            }
        }
        Ok(())
    }

    /// Re-resolve delayed items until no more of them become ready.
    pub(crate) fn resolve_pending(&mut self) -> Result<()> {
        loop {
            let mut progressed = false;
            for pending in self.delayed() {
                progressed |= self.place(&pending, true)?;
            }
            if !progressed {
                return Ok(());
            }
        }
    }

    /// Distinct delayed items, in slot order.
    fn delayed(&self) -> Vec<Rc<Pending>> {
        let mut found: Vec<Rc<Pending>> = Vec::new();
        for slot in self.slots.values() {
            if let Slot::Delayed(pending) = slot {
                if !found.iter().any(|p| Rc::ptr_eq(p, pending)) {
                    found.push(pending.clone());
                }
            }
        }
        found
    }

    /// Fail if delayed fields wait on each other in a loop.
    pub(crate) fn check_cycles(&self) -> Result<()> {
        let mut done = HashSet::new();
        for name in self.slots.keys() {
            let mut path = Vec::new();
            if let Some(cycle) = self.find_cycle(name, &mut done, &mut path) {
                return Err(MapError::Cycle { fields: cycle }.into());
            }
        }
        Ok(())
    }

    fn find_cycle<'a>(
        &'a self,
        name: &'a str,
        done: &mut HashSet<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        if done.contains(name) || !matches!(self.slots.get(name), Some(Slot::Delayed(_))) {
            return None;
        }

        path.push(name);
        for blocker in self.waiting.get(name).into_iter().flatten() {
            if let Some(cycle) = self.find_cycle(blocker, done, path) {
                return Some(cycle);
            }
        }
        path.pop();
        done.insert(name);
        None
    }

    /// Run the second phase and produce the map.
    pub(crate) fn finish(mut self) -> Result<FrozenMap> {
        self.resolve_pending()?;
        self.check_cycles()?;
        let slots = self.slots;
        let waiting = self
            .waiting
            .into_iter()
            .filter(|(name, _)| matches!(slots.get(name), Some(Slot::Delayed(_))))
            .collect();
        Ok(FrozenMap::from_parts(slots, waiting))
    }
}

/// Wrap a concrete value; nested maps must be complete.
fn concrete(value: &Value) -> Result<Entry> {
    if let Value::Map(map) = value {
        if !map.is_ready() {
            return Err(MapError::usage(format!(
                "cannot nest a map with unready fields: {}",
                map.unready().join(", ")
            ))
            .into());
        }
    }
    Entry::concrete(value.clone())
}
