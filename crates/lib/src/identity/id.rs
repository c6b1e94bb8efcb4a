//! The textual form of an [`Identity`].
//!
//! An `ID` is always the 40-character lower-case hex rendering of a valid
//! group element: it is produced by [`Identity::id`] or parsed with
//! [`ID::parse`], which checks the text decodes to an identity. Maps and
//! payloads are stored under their `ID`.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Identity, IdentityError};

/// Storable key of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ID(String);

impl ID {
    /// Wrap the hex encoding of an identity.
    pub(super) fn from_hex(hex: String) -> Self {
        Self(hex)
    }

    /// Parse and validate a textual id.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        Ok(Identity::from_id(text)?.id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for human-oriented output.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<Identity> for ID {
    fn from(identity: Identity) -> Self {
        identity.id()
    }
}

impl TryFrom<&str> for ID {
    type Error = IdentityError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        ID::parse(text)
    }
}

impl FromStr for ID {
    type Err = IdentityError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        ID::parse(text)
    }
}

impl AsRef<str> for ID {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for ID {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ID {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ID {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        ID::parse(&text).map_err(serde::de::Error::custom)
    }
}
