use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a resolved publication date came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Google Books volumes API (primary source).
    GoogleBooks,
    /// Open Library books API (secondary source).
    OpenLibrary,
}

impl SourceKind {
    /// Human-readable label, also the value persisted in the index.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoogleBooks => "Google Books",
            Self::OpenLibrary => "Open Library",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google books" | "google_books" | "googlebooks" => Ok(Self::GoogleBooks),
            "open library" | "open_library" | "openlibrary" => Ok(Self::OpenLibrary),
            other => Err(format!("Unknown source: {}", other)),
        }
    }
}

/// A successful answer from one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderHit {
    /// The publication date as the source reported it. Never blank.
    pub value: String,
    pub source: SourceKind,
}
