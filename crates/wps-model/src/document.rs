//! Top-level WPS documents

use crate::capabilities::Capabilities;
use crate::offerings::ProcessOfferings;
use crate::projection::WireCodec;
use crate::result::ExecuteResult;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wps_ir::{Element, Version};

/// Any document the binder knows how to bind, keyed on its canonical root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum WpsDocument {
    Capabilities(Capabilities),
    ProcessOfferings(ProcessOfferings),
    Result(ExecuteResult),
}

impl WpsDocument {
    /// Canonical root element names this enum can bind
    pub const ROOTS: [&'static str; 3] = [
        Capabilities::ELEMENT,
        ProcessOfferings::ELEMENT,
        ExecuteResult::ELEMENT,
    ];

    /// Bind a canonical tree, dispatching on its root element
    pub fn decode(version: Version, root: &Element) -> Result<Self> {
        let document = match root.name.local.as_str() {
            Capabilities::ELEMENT => Self::Capabilities(Capabilities::decode(version, root)?),
            ProcessOfferings::ELEMENT => {
                Self::ProcessOfferings(ProcessOfferings::decode(version, root)?)
            }
            ExecuteResult::ELEMENT => Self::Result(ExecuteResult::decode(version, root)?),
            other => {
                return Err(Error::UnexpectedRoot {
                    found: other.to_string(),
                });
            }
        };
        debug!(root = document.root_name(), %version, "Bound document");
        Ok(document)
    }

    pub fn encode(&self, version: Version) -> Element {
        match self {
            Self::Capabilities(c) => c.encode(version),
            Self::ProcessOfferings(p) => p.encode(version),
            Self::Result(r) => r.encode(version),
        }
    }

    /// Canonical root element name
    pub fn root_name(&self) -> &'static str {
        match self {
            Self::Capabilities(_) => Capabilities::ELEMENT,
            Self::ProcessOfferings(_) => ProcessOfferings::ELEMENT,
            Self::Result(_) => ExecuteResult::ELEMENT,
        }
    }
}

impl From<Capabilities> for WpsDocument {
    fn from(value: Capabilities) -> Self {
        Self::Capabilities(value)
    }
}

impl From<ProcessOfferings> for WpsDocument {
    fn from(value: ProcessOfferings) -> Self {
        Self::ProcessOfferings(value)
    }
}

impl From<ExecuteResult> for WpsDocument {
    fn from(value: ExecuteResult) -> Self {
        Self::Result(value)
    }
}
