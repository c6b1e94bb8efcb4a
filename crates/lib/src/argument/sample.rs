//! Lazily resolved random draws.
//!
//! A [`Sample`] stands for "some value out of this progression". It stays
//! unresolved inside a map until a caller supplies a generator, so two runs
//! with the same seed always pick the same values.

use rand::Rng;

use crate::{Result, map::MapError, value::Value};

/// The set of values a sample draws from.
#[derive(Debug, Clone, PartialEq)]
pub enum Progression {
    /// An explicit list of candidates.
    Values(Vec<Value>),
    /// Integers `start, start + step, ...` up to and including `end` when reached.
    Range { start: i64, end: i64, step: i64 },
}

/// A pending draw from a [`Progression`].
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    progression: Progression,
}

impl Sample {
    /// Draw from an explicit list of candidates.
    pub fn values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Result<Self> {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Err(MapError::usage("a sample needs at least one candidate").into());
        }
        Ok(Self {
            progression: Progression::Values(values),
        })
    }

    /// Draw from the arithmetic progression `start..=end` by `step`.
    ///
    /// Progressions with more candidates than fit in a `usize` are rejected.
    pub fn range(start: i64, end: i64, step: i64) -> Result<Self> {
        if step <= 0 || end < start || range_len(start, end, step).is_none() {
            return Err(MapError::usage(format!(
                "invalid sample range {start}..={end} by {step}"
            ))
            .into());
        }
        Ok(Self {
            progression: Progression::Range { start, end, step },
        })
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        match &self.progression {
            Progression::Values(values) => values.len(),
            Progression::Range { start, end, step } => range_len(*start, *end, *step).unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `index`-th candidate, if any.
    pub fn nth(&self, index: usize) -> Option<Value> {
        if index >= self.len() {
            return None;
        }
        match &self.progression {
            Progression::Values(values) => values.get(index).cloned(),
            Progression::Range { start, step, .. } => {
                // Below `len`, the candidate lies within `start..=end`.
                let value = i128::from(*start) + i128::from(*step) * index as i128;
                i64::try_from(value).ok().map(Value::Int)
            }
        }
    }

    /// Pick one candidate uniformly with the caller's generator.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        // Constructors guarantee at least one candidate.
        let len = self.len();
        if len == 0 {
            return Value::Null;
        }
        self.nth(rng.gen_range(0..len)).unwrap_or(Value::Null)
    }

    /// Whether `value` is one of the candidates.
    pub fn contains(&self, value: &Value) -> bool {
        match &self.progression {
            Progression::Values(values) => values.contains(value),
            Progression::Range { start, end, step } => match value {
                Value::Int(i) => {
                    i >= start
                        && i <= end
                        && (i128::from(*i) - i128::from(*start)) % i128::from(*step) == 0
                }
                _ => false,
            },
        }
    }
}

/// Candidate count of `start..=end` by `step`, if it fits in a `usize`.
fn range_len(start: i64, end: i64, step: i64) -> Option<usize> {
    if step <= 0 || end < start {
        return None;
    }
    let span = i128::from(end) - i128::from(start);
    usize::try_from(span / i128::from(step) + 1).ok()
}
