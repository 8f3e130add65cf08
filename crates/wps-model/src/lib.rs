//! # wps-model
//!
//! Canonical WPS records and their wire codecs.
//!
//! One record per concept, always named in the current vocabulary. Properties
//! that only one vocabulary carries are stored unconditionally but projected
//! through [`Gated`] accessors keyed on an explicit [`wps_ir::Version`];
//! wrapper elements that only the legacy vocabulary has are realised as
//! proxies over the owning record's flat lists (see [`proxy`]).
//!
//! Records encode to and decode from a [`wps_ir::Element`] tree in canonical
//! names. Renaming to and from the legacy names is the job of the stream
//! rewriters in `wps-pipeline`, so the codecs only shape structure.

pub mod capabilities;
pub mod document;
pub mod offerings;
pub mod projection;
pub mod proxy;
pub mod result;
mod wire;

pub use capabilities::{Capabilities, ProcessSummary};
pub use document::WpsDocument;
pub use offerings::{
    BoundingBoxDescription, ComplexDescription, DataDescription, Format, InputDescription,
    LiteralDescription, OutputDescription, ProcessOffering, ProcessOfferings,
};
pub use projection::{CurrentOnly, CurrentWire, Gated, LegacyOnly, LegacyWire, WireCodec, WireScope};
pub use proxy::{Proxy, ProxySlot, WrapperProxy};
pub use result::{DataValue, ExecuteResult, OutputData};

use thiserror::Error;

/// Errors that can occur when binding canonical records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Proxy <{wrapper}> accessed before its owner was bound")]
    UnboundProxy { wrapper: &'static str },

    #[error("Proxy <{wrapper}> is already bound to an owner")]
    AlreadyBound { wrapper: &'static str },

    #[error("Missing element <{element}> in <{context}>")]
    MissingElement { context: String, element: String },

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unexpected root element <{found}>")]
    UnexpectedRoot { found: String },

    #[error(transparent)]
    Structure(#[from] wps_ir::Error),
}

impl Error {
    pub fn missing_element(context: impl Into<String>, element: impl Into<String>) -> Self {
        Self::MissingElement {
            context: context.into(),
            element: element.into(),
        }
    }

    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
