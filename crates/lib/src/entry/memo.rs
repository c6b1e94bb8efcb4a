//! Write-once memo cells for lazily computed values.

use std::cell::RefCell;

use crate::{Result, value::Value};

#[derive(Debug)]
enum MemoState {
    Unevaluated,
    Evaluated(Value),
}

/// Holds a value that is computed at most once.
///
/// A failed computation leaves the cell unevaluated, so the next read retries.
#[derive(Debug)]
pub(crate) struct Memo {
    state: RefCell<MemoState>,
}

impl Memo {
    pub(crate) fn new() -> Self {
        Self {
            state: RefCell::new(MemoState::Unevaluated),
        }
    }

    pub(crate) fn get(&self) -> Option<Value> {
        match &*self.state.borrow() {
            MemoState::Evaluated(value) => Some(value.clone()),
            MemoState::Unevaluated => None,
        }
    }

    pub(crate) fn is_evaluated(&self) -> bool {
        matches!(&*self.state.borrow(), MemoState::Evaluated(_))
    }

    /// Return the stored value, computing and storing it on the first call.
    pub(crate) fn get_or_try_init(&self, compute: impl FnOnce() -> Result<Value>) -> Result<Value> {
        if let Some(value) = self.get() {
            return Ok(value);
        }
        // The borrow is released while computing; the computation may read
        // other memo cells.
        let value = compute()?;
        let mut state = self.state.borrow_mut();
        if let MemoState::Evaluated(existing) = &*state {
            return Ok(existing.clone());
        }
        *state = MemoState::Evaluated(value.clone());
        Ok(value)
    }
}
