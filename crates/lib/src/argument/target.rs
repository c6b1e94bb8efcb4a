//! Output field names of a map item.

use crate::{Result, map::MapError};

/// Where the result of an item goes.
///
/// `Many` unpacks a list (by position) or a dict (by sorted key); `Renamed`
/// picks named keys out of a dict result, written `"target=source"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Single(String),
    Many(Vec<String>),
    Renamed(Vec<(String, String)>),
}

impl Target {
    /// Parse a list of output names.
    ///
    /// A single plain name gives `Single`; plain names give `Many`; names of
    /// the form `target=source` give `Renamed`. Mixing the two forms is an error.
    pub fn parse<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Target> {
        let names: Vec<String> = names
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        if names.is_empty() {
            return Err(MapError::usage("no output fields given").into());
        }

        let renamed = names.iter().filter(|n| n.contains('=')).count();
        let target = if renamed == 0 {
            if names.len() == 1 {
                Target::Single(names[0].clone())
            } else {
                Target::Many(names)
            }
        } else if renamed == names.len() {
            Target::Renamed(
                names
                    .iter()
                    .filter_map(|n| n.split_once('='))
                    .map(|(t, s)| (t.trim().to_string(), s.trim().to_string()))
                    .collect(),
            )
        } else {
            return Err(MapError::usage(format!(
                "cannot mix renamed and plain outputs: {}",
                names.join(", ")
            ))
            .into());
        };
        target.check()?;
        Ok(target)
    }

    /// Build a renaming target from `(target, source)` pairs.
    pub fn renamed<T: Into<String>, S: Into<String>>(
        pairs: impl IntoIterator<Item = (T, S)>,
    ) -> Result<Target> {
        let target = Target::Renamed(
            pairs
                .into_iter()
                .map(|(t, s)| (t.into(), s.into()))
                .collect(),
        );
        target.check()?;
        Ok(target)
    }

    fn check(&self) -> Result<()> {
        let names = self.names();
        if names.is_empty() {
            return Err(MapError::usage("no output fields given").into());
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(MapError::usage(format!("duplicate output field '{name}'")).into());
            }
        }
        Ok(())
    }

    /// The output field names, in the order given.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Target::Single(name) => vec![name.as_str()],
            Target::Many(names) => names.iter().map(String::as_str).collect(),
            Target::Renamed(pairs) => pairs.iter().map(|(t, _)| t.as_str()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Target::Single(_) => 1,
            Target::Many(names) => names.len(),
            Target::Renamed(pairs) => pairs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Single(name) => write!(f, "{name}"),
            Target::Many(names) => write!(f, "({})", names.join(", ")),
            Target::Renamed(pairs) => {
                let parts: Vec<String> = pairs.iter().map(|(t, s)| format!("{t}={s}")).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        Target::Single(name.to_string())
    }
}

impl From<String> for Target {
    fn from(name: String) -> Self {
        Target::Single(name)
    }
}

impl<const N: usize> From<[&str; N]> for Target {
    fn from(names: [&str; N]) -> Self {
        Target::Many(names.iter().map(|n| n.to_string()).collect())
    }
}
