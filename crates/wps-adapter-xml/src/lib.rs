//! # wps-adapter-xml
//!
//! XML adapter for reading and writing WPS documents as event streams.
//!
//! The reader turns a document into [`wps_ir::XmlEvent`]s through the
//! [`wps_ir::EventSource`] trait; the writer accepts them through
//! [`wps_ir::EventSink`]. Neither knows anything about WPS versions; the
//! version-aware rewriting lives in `wps-pipeline`.
//!
//! ## Example Usage
//!
//! ```rust
//! use wps_adapter_xml::{XmlAdapter, XmlConfig};
//! use wps_ir::{EventSink, EventSource};
//!
//! let config = XmlConfig::new().compact().write_declaration(false);
//! let adapter = XmlAdapter::new().with_config(config);
//! let mut reader = adapter.reader("<a><b>text</b></a>".as_bytes());
//! let mut writer = adapter.writer(Vec::new());
//! while let Some(event) = reader.next_event().unwrap() {
//!     writer.add(event).unwrap();
//! }
//! writer.finish().unwrap();
//! assert_eq!(writer.into_inner(), b"<a><b>text</b></a>");
//! ```

pub mod config;
pub mod errors;
pub mod reader;
pub mod writer;

pub use config::{PrefixBinding, XmlConfig};
pub use errors::{XmlError, XmlResult};
pub use reader::XmlEventReader;
pub use writer::XmlEventWriter;

pub use errors::XmlError as Error;
pub type Result<T> = XmlResult<T>;

use std::io::{BufRead, Write};
use wps_ir::{EventSource, XmlEvent};

/// XML adapter that combines reader and writer functionality
#[derive(Debug, Clone, Default)]
pub struct XmlAdapter {
    config: XmlConfig,
}

impl XmlAdapter {
    /// Create a new XML adapter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create adapter with configuration
    pub fn with_config(mut self, config: XmlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &XmlConfig {
        &self.config
    }

    /// Get a reader configured with this adapter's settings
    pub fn reader<R: BufRead>(&self, inner: R) -> XmlEventReader<R> {
        XmlEventReader::with_config(inner, &self.config)
    }

    /// Get a writer configured with this adapter's settings
    pub fn writer<W: Write>(&self, inner: W) -> XmlEventWriter<W> {
        XmlEventWriter::with_config(inner, self.config.clone())
    }

    /// Read a whole in-memory document into events
    pub fn read_events(&self, xml: &str) -> Result<Vec<XmlEvent>> {
        let mut reader = self.reader(xml.as_bytes());
        let mut events = Vec::new();
        while let Some(event) = reader.next_event()? {
            events.push(event);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wps_ir::EventSink;

    #[test]
    fn test_adapter_round_trip() {
        let config = XmlConfig::new().compact().write_declaration(false);
        let adapter = XmlAdapter::new().with_config(config);
        let xml = r#"<wps:Result xmlns:wps="http://www.opengis.net/wps/2.0"><wps:JobID>42</wps:JobID></wps:Result>"#;
        let events = adapter.read_events(xml).unwrap();

        let mut writer = adapter.writer(Vec::new());
        writer.add_all(events).unwrap();
        writer.finish().unwrap();
        assert_eq!(String::from_utf8(writer.into_inner()).unwrap(), xml);
    }
}
