//! Version-conditioned property projection
//!
//! A [`Gated`] property belongs to one wire vocabulary. Its setter always
//! stores, so a value read from one vocabulary survives a trip through the
//! other; its accessor only reports the value when asked for the vocabulary
//! the property belongs to.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use wps_ir::{Element, Version};

/// Marker naming the vocabulary a gated property belongs to
pub trait WireScope {
    const VERSION: Version;
}

/// Properties only the legacy (1.0.0) vocabulary carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyWire;

/// Properties only the current (2.0) vocabulary carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurrentWire;

impl WireScope for LegacyWire {
    const VERSION: Version = Version::Legacy;
}

impl WireScope for CurrentWire {
    const VERSION: Version = Version::Current;
}

/// A canonical field that is projected into one vocabulary only
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gated<T, W> {
    value: Option<T>,
    #[serde(skip)]
    scope: PhantomData<W>,
}

pub type LegacyOnly<T> = Gated<T, LegacyWire>;
pub type CurrentOnly<T> = Gated<T, CurrentWire>;

impl<T, W: WireScope> Gated<T, W> {
    pub fn new() -> Self {
        Self {
            value: None,
            scope: PhantomData,
        }
    }

    /// A gated field already holding `value`
    pub fn with(value: T) -> Self {
        Self {
            value: Some(value),
            scope: PhantomData,
        }
    }

    /// The stored value when `version` is the vocabulary this property
    /// belongs to, `None` otherwise
    pub fn get(&self, version: Version) -> Option<&T> {
        if version == W::VERSION {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Store a value, whatever vocabulary is in use
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Store an optional value decoded from the wire
    pub fn set_opt(&mut self, value: Option<T>) {
        if let Some(value) = value {
            self.value = Some(value);
        }
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    /// The stored value regardless of vocabulary
    pub fn stored(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Vocabulary this property is emitted in
    pub fn wire_version(&self) -> Version {
        W::VERSION
    }
}

impl<T, W: WireScope> Default for Gated<T, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, W> Clone for Gated<T, W> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            scope: PhantomData,
        }
    }
}

impl<T: PartialEq, W> PartialEq for Gated<T, W> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq, W> Eq for Gated<T, W> {}

impl<T: fmt::Debug, W: WireScope> fmt::Debug for Gated<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gated")
            .field("wire", &W::VERSION)
            .field("value", &self.value)
            .finish()
    }
}

/// Explicit encode/decode pair between a canonical record and its wire
/// element, selected by the version of the document being bound
pub trait WireCodec: Sized {
    /// Canonical local name of the element this record binds to
    const ELEMENT: &'static str;

    fn encode(&self, version: Version) -> Element;

    fn decode(version: Version, element: &Element) -> Result<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated_projection_follows_version() {
        let mut update_sequence: LegacyOnly<String> = Gated::new();
        update_sequence.set("7".to_string());

        assert_eq!(update_sequence.get(Version::Current), None);
        assert_eq!(update_sequence.get(Version::Legacy).map(String::as_str), Some("7"));
        assert_eq!(update_sequence.stored().map(String::as_str), Some("7"));
        assert_eq!(update_sequence.wire_version(), Version::Legacy);

        let job_control: CurrentOnly<Vec<String>> = Gated::with(vec!["sync-execute".to_string()]);
        assert!(job_control.get(Version::Legacy).is_none());
        assert_eq!(job_control.get(Version::Current).map(Vec::len), Some(1));
    }

    #[test]
    fn test_set_opt_keeps_existing_value() {
        let mut flag: LegacyOnly<bool> = Gated::with(true);
        flag.set_opt(None);
        assert_eq!(flag.stored(), Some(&true));
        flag.clear();
        assert_eq!(flag.stored(), None);
    }

    #[test]
    fn test_serializes_as_plain_value() {
        let flag: LegacyOnly<bool> = Gated::with(true);
        assert_eq!(serde_json::to_string(&flag).unwrap(), "true");
        let back: LegacyOnly<bool> = serde_json::from_str("null").unwrap();
        assert_eq!(back, Gated::new());
    }
}
