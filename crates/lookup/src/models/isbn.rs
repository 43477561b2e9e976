use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::LookupError;

/// Normalized book identifier.
///
/// Hyphens and whitespace are stripped, so `"978-0-00-000000-1"` and
/// `" 9780000000001 "` are the same key. An `Isbn` is never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    /// Normalize a raw cell or query value into an identifier.
    pub fn parse(raw: &str) -> Result<Self, LookupError> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();

        if normalized.is_empty() {
            return Err(LookupError::InvalidIdentifier(raw.to_string()));
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compound key used by catalogues that namespace identifiers,
    /// e.g. `ISBN:9780000000001`.
    pub fn bibkey(&self) -> String {
        format!("ISBN:{}", self.0)
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Isbn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Isbn {
    type Error = LookupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(value: Isbn) -> Self {
        value.0
    }
}
