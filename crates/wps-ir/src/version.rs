//! Wire vocabulary versions

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which wire vocabulary a document is read from or written to.
///
/// One value is chosen per top-level read or write operation and passed
/// explicitly to every rewriter and codec involved in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    /// WPS 1.0.0 / OWS 1.1
    Legacy,

    /// WPS 2.0 / OWS 2.0, the vocabulary the canonical model is named after
    #[default]
    Current,
}

impl Version {
    /// Value of the root `version` attribute written for this vocabulary
    pub fn wire_version(self) -> &'static str {
        match self {
            Self::Legacy => "1.0.0",
            Self::Current => "2.0.0",
        }
    }

    pub fn is_legacy(self) -> bool {
        self == Self::Legacy
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Accepts the names (`legacy`, `current`, `v1`, `v2`) and wire versions.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" | "1" | "1.0" | "1.0.0" => Ok(Self::Legacy),
            "current" | "v2" | "2" | "2.0" | "2.0.0" => Ok(Self::Current),
            other => Err(Error::UnknownVersion(other.to_string())),
        }
    }
}
