//! XML reader
//!
//! Pull-parses a document with quick-xml and hands it out as [`XmlEvent`]s.
//! The prolog (declaration, doctype, processing instructions and comments
//! outside the root) is dropped, so the first event of a document is always
//! the root start element.

use crate::config::XmlConfig;
use crate::errors::{XmlError, XmlResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};
use wps_ir::{Attribute, EventSource, QName, XmlEvent};

/// Streaming event source over an XML document
pub struct XmlEventReader<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    pending: VecDeque<XmlEvent>,
    preserve_comments: bool,
    depth: usize,
    root_closed: bool,
    finished: bool,
    events_read: usize,
}

impl<R: BufRead> XmlEventReader<R> {
    /// Create a reader with default configuration
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, &XmlConfig::default())
    }

    /// Create a reader with the given configuration
    pub fn with_config(inner: R, config: &XmlConfig) -> Self {
        let mut reader = NsReader::from_reader(inner);
        let parser = reader.config_mut();
        parser.trim_text(config.trim_text);
        parser.expand_empty_elements = true;

        Self {
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
            preserve_comments: config.preserve_comments,
            depth: 0,
            root_closed: false,
            finished: false,
            events_read: 0,
        }
    }

    /// Byte offset of the parser in the input
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    /// Number of events handed out so far
    pub fn events_read(&self) -> usize {
        self.events_read
    }

    /// Parse until at least one event is queued or the input is exhausted
    fn fill(&mut self) -> XmlResult<()> {
        while self.pending.is_empty() && !self.finished {
            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|e| XmlError::read_at(position, e.to_string()))?;

            match event {
                Event::Start(start) => {
                    if self.depth == 0 && self.root_closed {
                        return Err(XmlError::read_at(position, "content after the root element"));
                    }
                    let (name, attributes, namespaces) =
                        start_parts(&self.reader, &start, position)?;
                    self.depth += 1;
                    self.pending.push_back(XmlEvent::start(name, attributes));
                    self.pending.extend(namespaces);
                }
                Event::End(end) => {
                    let (namespace, local) = self.reader.resolve_element(end.name());
                    let namespace = resolved_namespace(namespace, position)?;
                    let local = utf8(local.as_ref(), "element name", position)?;
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        self.root_closed = true;
                    }
                    self.pending.push_back(XmlEvent::end(QName::new(namespace, local)));
                }
                Event::Text(text) if self.depth > 0 => {
                    let text = text
                        .unescape()
                        .map_err(|e| XmlError::read_at(position, e.to_string()))?;
                    if !text.is_empty() {
                        self.pending.push_back(XmlEvent::text(text.into_owned()));
                    }
                }
                Event::Text(text) => {
                    if !text.iter().all(u8::is_ascii_whitespace) {
                        return Err(XmlError::read_at(
                            position,
                            "character data outside the root element",
                        ));
                    }
                }
                Event::CData(data) if self.depth > 0 => {
                    let text = utf8(&data, "CDATA section", position)?;
                    self.pending.push_back(XmlEvent::text(text));
                }
                Event::Comment(comment) if self.depth > 0 && self.preserve_comments => {
                    let text = String::from_utf8_lossy(&comment).into_owned();
                    self.pending.push_back(XmlEvent::Comment(text));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(XmlError::read_at(
                            position,
                            format!("document ended with {} element(s) open", self.depth),
                        ));
                    }
                    debug!(events = self.events_read, "Finished reading XML document");
                    self.finished = true;
                }
                // Prolog, processing instructions and stray comments carry no content.
                _ => {}
            }
        }
        Ok(())
    }
}

impl XmlEventReader<BufReader<File>> {
    /// Open a file for reading
    pub fn from_file(path: impl AsRef<Path>) -> XmlResult<Self> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened XML file");
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> XmlEventReader<&'a [u8]> {
    /// Read from an in-memory document
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> EventSource for XmlEventReader<R> {
    type Error = XmlError;

    fn has_next(&mut self) -> XmlResult<bool> {
        self.fill()?;
        Ok(!self.pending.is_empty())
    }

    fn peek(&mut self) -> XmlResult<Option<&XmlEvent>> {
        self.fill()?;
        Ok(self.pending.front())
    }

    fn next_event(&mut self) -> XmlResult<Option<XmlEvent>> {
        self.fill()?;
        let event = self.pending.pop_front();
        if let Some(event) = &event {
            self.events_read += 1;
            trace!(?event, "Read XML event");
        }
        Ok(event)
    }
}

/// Split a start tag into its resolved name, attributes and namespace
/// declaration events
fn start_parts<R>(
    reader: &NsReader<R>,
    start: &BytesStart<'_>,
    position: u64,
) -> XmlResult<(QName, Vec<Attribute>, Vec<XmlEvent>)> {
    let (namespace, local) = reader.resolve_element(start.name());
    let name = QName::new(
        resolved_namespace(namespace, position)?,
        utf8(local.as_ref(), "element name", position)?,
    );

    let mut attributes = Vec::new();
    let mut namespaces = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlError::read_at(position, e.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError::read_at(position, e.to_string()))?
            .into_owned();

        match attr.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => {
                namespaces.push(XmlEvent::Namespace { prefix: None, uri: value });
            }
            Some(PrefixDeclaration::Named(prefix)) => {
                let prefix = utf8(prefix, "namespace prefix", position)?;
                namespaces.push(XmlEvent::Namespace {
                    prefix: Some(prefix),
                    uri: value,
                });
            }
            None => {
                let (namespace, local) = reader.resolve_attribute(attr.key);
                let attr_name = QName::new(
                    resolved_namespace(namespace, position)?,
                    utf8(local.as_ref(), "attribute name", position)?,
                );
                attributes.push(Attribute::new(attr_name, value));
            }
        }
    }
    Ok((name, attributes, namespaces))
}

fn resolved_namespace(result: ResolveResult<'_>, position: u64) -> XmlResult<String> {
    match result {
        ResolveResult::Bound(namespace) => utf8(namespace.as_ref(), "namespace URI", position),
        ResolveResult::Unbound => Ok(String::new()),
        ResolveResult::Unknown(prefix) => Err(XmlError::UnboundPrefix {
            prefix: String::from_utf8_lossy(&prefix).into_owned(),
            position,
        }),
    }
}

fn utf8(bytes: &[u8], context: &str, position: u64) -> XmlResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| XmlError::encoding(context, position))
}

#[cfg(test)]
mod tests {
    use super::*;

    const WPS2: &str = "http://www.opengis.net/wps/2.0";
    const OWS2: &str = "http://www.opengis.net/ows/2.0";

    fn read_all(xml: &str) -> XmlResult<Vec<XmlEvent>> {
        let mut reader = XmlEventReader::from_xml(xml);
        let mut events = Vec::new();
        while let Some(event) = reader.next_event()? {
            events.push(event);
        }
        Ok(events)
    }

    #[test]
    fn test_prolog_is_dropped() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<wps:Capabilities xmlns:wps="http://www.opengis.net/wps/2.0" service="WPS" version="2.0.0"/>
"#;
        let mut reader = XmlEventReader::from_xml(xml);
        let first = reader.peek().unwrap().cloned().unwrap();
        assert_eq!(first.name(), Some(&QName::new(WPS2, "Capabilities")));
        assert_eq!(first.attribute("version"), Some("2.0.0"));
        assert_eq!(first.attribute("service"), Some("WPS"));

        let events = read_all(xml).unwrap();
        assert_eq!(
            events,
            vec![
                XmlEvent::start(
                    QName::new(WPS2, "Capabilities"),
                    vec![
                        Attribute::unqualified("service", "WPS"),
                        Attribute::unqualified("version", "2.0.0"),
                    ]
                ),
                XmlEvent::namespace(Some("wps"), WPS2),
                XmlEvent::end(QName::new(WPS2, "Capabilities")),
            ]
        );
    }

    #[test]
    fn test_empty_elements_expand_to_start_and_end() {
        let xml = r#"<wps:Contents xmlns:wps="http://www.opengis.net/wps/2.0"><wps:ProcessSummary/></wps:Contents>"#;
        let events = read_all(xml).unwrap();
        assert_eq!(
            events,
            vec![
                XmlEvent::start(QName::new(WPS2, "Contents"), vec![]),
                XmlEvent::namespace(Some("wps"), WPS2),
                XmlEvent::start(QName::new(WPS2, "ProcessSummary"), vec![]),
                XmlEvent::end(QName::new(WPS2, "ProcessSummary")),
                XmlEvent::end(QName::new(WPS2, "Contents")),
            ]
        );

        assert!(read_all("<Result/><Result/>").is_err());
    }

    #[test]
    fn test_default_namespace_and_text() {
        let xml = r#"<Result xmlns="http://www.opengis.net/wps/2.0" xmlns:ows="http://www.opengis.net/ows/2.0">
  <ows:Title>Buffer &amp; clip</ows:Title>
  <Data><![CDATA[<raw/>]]></Data>
</Result>"#;
        let events = read_all(xml).unwrap();
        assert_eq!(events[0].name(), Some(&QName::new(WPS2, "Result")));
        assert_eq!(events[1], XmlEvent::namespace(None, WPS2));
        assert_eq!(events[2], XmlEvent::namespace(Some("ows"), OWS2));
        assert_eq!(events[3].name(), Some(&QName::new(OWS2, "Title")));
        assert_eq!(events[4], XmlEvent::text("Buffer & clip"));
        assert_eq!(events[7], XmlEvent::text("<raw/>"));
        assert_eq!(events.last().unwrap(), &XmlEvent::end(QName::new(WPS2, "Result")));
    }

    #[test]
    fn test_unprefixed_attribute_has_no_namespace() {
        let xml = r#"<p:Input xmlns:p="urn:p" p:id="a" minOccurs="0"/>"#;
        let events = read_all(xml).unwrap();
        match &events[0] {
            XmlEvent::StartElement { attributes, .. } => {
                assert_eq!(attributes[0].name, QName::new("urn:p", "id"));
                assert_eq!(attributes[1].name, QName::local("minOccurs"));
            }
            other => panic!("expected start element, got {other:?}"),
        }
    }

    #[test]
    fn test_comments_are_optional() {
        let xml = "<a><!-- note --><b/></a>";
        let events = read_all(xml).unwrap();
        assert!(!events.iter().any(|e| matches!(e, XmlEvent::Comment(_))));

        let config = XmlConfig::new().preserve_comments(true);
        let mut reader = XmlEventReader::with_config(xml.as_bytes(), &config);
        reader.next_event().unwrap();
        assert_eq!(
            reader.next_event().unwrap(),
            Some(XmlEvent::Comment(" note ".to_string()))
        );
    }

    #[test]
    fn test_unbound_prefix_is_reported() {
        let err = read_all("<x:a/>").unwrap_err();
        assert!(matches!(err, XmlError::UnboundPrefix { ref prefix, .. } if prefix == "x"));
    }

    #[test]
    fn test_malformed_documents_fail() {
        assert!(matches!(read_all("<a><b></a>"), Err(XmlError::Read { .. })));
        assert!(matches!(read_all("<a><b></b>"), Err(XmlError::Read { .. })));
        assert!(matches!(read_all("<a/><b/>"), Err(XmlError::Read { .. })));
    }

    #[test]
    fn test_event_count_and_exhaustion() {
        let mut reader = XmlEventReader::from_xml("<a><b>x</b></a>");
        assert!(reader.has_next().unwrap());
        while reader.next_event().unwrap().is_some() {}
        assert_eq!(reader.events_read(), 5);
        assert!(!reader.has_next().unwrap());
        assert_eq!(reader.peek().unwrap(), None);
    }
}
