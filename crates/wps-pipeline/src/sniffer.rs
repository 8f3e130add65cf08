//! Version detection from the root start element

use tracing::debug;
use wps_ir::{EventSource, Version, XmlEvent};

/// Decides which vocabulary a document is written in.
///
/// Only the `service` and `version` attributes of the root start element
/// are consulted, and the source is never advanced: [`VersionSniffer::sniff`]
/// uses `peek`. Anything that is not a recognisable declaration reads as
/// [`Version::Current`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSniffer {
    service: String,
    legacy_token: String,
    current_token: String,
}

impl Default for VersionSniffer {
    fn default() -> Self {
        Self::new("WPS", "1.", "2.")
    }
}

impl VersionSniffer {
    /// A sniffer for `service` whose legacy and current `version` values
    /// start with the given tokens
    pub fn new(
        service: impl Into<String>,
        legacy_token: impl Into<String>,
        current_token: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            legacy_token: legacy_token.into(),
            current_token: current_token.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Detect the version of the document at the head of `source`
    pub fn sniff<S: EventSource>(&self, source: &mut S) -> Result<Version, S::Error> {
        match source.peek()? {
            Some(event) => Ok(self.detect(event)),
            None => {
                debug!("Empty event stream, assuming current version");
                Ok(Version::Current)
            }
        }
    }

    /// Detect the version declared by a root start element
    pub fn detect(&self, event: &XmlEvent) -> Version {
        let XmlEvent::StartElement { name, .. } = event else {
            debug!("Stream does not open with an element, assuming current version");
            return Version::Current;
        };

        let service = event.attribute("service").map(str::trim);
        let declared = event.attribute("version").map(str::trim);

        match (service, declared) {
            (Some(service), Some(declared)) if service.eq_ignore_ascii_case(&self.service) => {
                if declared.starts_with(self.legacy_token.as_str()) {
                    Version::Legacy
                } else if declared.starts_with(self.current_token.as_str()) {
                    Version::Current
                } else {
                    debug!(
                        root = %name,
                        version = declared,
                        "Unrecognised version, assuming current"
                    );
                    Version::Current
                }
            }
            _ => {
                debug!(
                    root = %name,
                    service = ?service,
                    version = ?declared,
                    "No usable version declaration, assuming current"
                );
                Version::Current
            }
        }
    }
}
