//! XML writer
//!
//! Serializes [`XmlEvent`]s with quick-xml. A start element is held back
//! until the next non-namespace event so that the `Namespace` events
//! following it become `xmlns` attributes of the same tag. Names whose
//! namespace is not in scope get a declaration on the element using them,
//! with a configured preferred prefix or a generated `nsN` one.

use crate::config::XmlConfig;
use crate::errors::{XmlError, XmlResult};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, trace};
use wps_ir::{Attribute, EventSink, QName, XmlEvent};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

type Binding = (Option<String>, String);

struct PendingStart {
    name: QName,
    attributes: Vec<Attribute>,
    bindings: Vec<Binding>,
}

struct OpenElement {
    name: QName,
    tag: String,
    bindings: Vec<Binding>,
}

/// Streaming event sink writing an XML document
pub struct XmlEventWriter<W: Write> {
    writer: Writer<W>,
    config: XmlConfig,
    pending: Option<PendingStart>,
    open: Vec<OpenElement>,
    generated: usize,
    declaration_written: bool,
    events_written: usize,
}

impl<W: Write> XmlEventWriter<W> {
    /// Create a writer with default configuration
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, XmlConfig::default())
    }

    /// Create a writer with the given configuration
    pub fn with_config(inner: W, config: XmlConfig) -> Self {
        let writer = match config.indent {
            Some(width) => Writer::new_with_indent(inner, b' ', width),
            None => Writer::new(inner),
        };
        Self {
            writer,
            config,
            pending: None,
            open: Vec::new(),
            generated: 0,
            declaration_written: false,
            events_written: 0,
        }
    }

    /// Number of events accepted so far
    pub fn events_written(&self) -> usize {
        self.events_written
    }

    /// Current element nesting depth
    pub fn depth(&self) -> usize {
        self.open.len() + usize::from(self.pending.is_some())
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_event(&mut self, event: Event<'_>) -> XmlResult<()> {
        self.writer
            .write_event(event)
            .map_err(|e| XmlError::write(e.to_string()))
    }

    fn write_declaration(&mut self) -> XmlResult<()> {
        if self.config.write_declaration && !self.declaration_written {
            self.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }
        self.declaration_written = true;
        Ok(())
    }

    /// URI currently bound to `prefix`, looking at `local` first
    fn bound_uri<'a>(&'a self, local: &'a [Binding], prefix: Option<&str>) -> Option<&'a str> {
        local
            .iter()
            .rev()
            .chain(self.open.iter().rev().flat_map(|e| e.bindings.iter().rev()))
            .find(|(p, _)| p.as_deref() == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// A prefix in scope for `uri`. `None` inside means the default namespace.
    fn prefix_for(
        &self,
        local: &[Binding],
        uri: &str,
        allow_default: bool,
    ) -> Option<Option<String>> {
        if uri == XML_NAMESPACE {
            return Some(Some("xml".to_string()));
        }
        local
            .iter()
            .rev()
            .chain(self.open.iter().rev().flat_map(|e| e.bindings.iter().rev()))
            .filter(|(p, u)| u == uri && (allow_default || p.is_some()))
            .find(|(p, _)| self.bound_uri(local, p.as_deref()) == Some(uri))
            .map(|(p, _)| p.clone())
    }

    /// Declare `uri` on the element being opened and return its prefix
    fn declare(&mut self, local: &mut Vec<Binding>, uri: &str) -> String {
        let preferred = self.config.preferred_prefix(uri).map(str::to_string);
        let prefix = match preferred {
            Some(p) if !local.iter().any(|(q, _)| q.as_deref() == Some(p.as_str())) => p,
            _ => loop {
                self.generated += 1;
                let candidate = format!("ns{}", self.generated);
                if self.bound_uri(local, Some(&candidate)).is_none() {
                    break candidate;
                }
            },
        };
        trace!(%prefix, %uri, "Declared namespace");
        local.push((Some(prefix.clone()), uri.to_string()));
        prefix
    }

    /// Write the held-back start tag, if any
    fn flush_pending(&mut self) -> XmlResult<()> {
        let Some(PendingStart {
            name,
            attributes,
            mut bindings,
        }) = self.pending.take()
        else {
            return Ok(());
        };

        let tag = if name.namespace.is_empty() {
            if self.bound_uri(&bindings, None).is_some_and(|uri| !uri.is_empty()) {
                bindings.push((None, String::new()));
            }
            name.local.clone()
        } else {
            let prefix = match self.prefix_for(&bindings, &name.namespace, true) {
                Some(prefix) => prefix,
                None => Some(self.declare(&mut bindings, &name.namespace)),
            };
            qualified(prefix.as_deref(), &name.local)
        };

        let mut rendered = Vec::with_capacity(attributes.len());
        for attr in &attributes {
            let key = if attr.name.namespace.is_empty() {
                attr.name.local.clone()
            } else {
                let prefix = match self.prefix_for(&bindings, &attr.name.namespace, false) {
                    Some(prefix) => prefix,
                    None => Some(self.declare(&mut bindings, &attr.name.namespace)),
                };
                qualified(prefix.as_deref(), &attr.name.local)
            };
            rendered.push((key, attr.value.as_str()));
        }

        let mut start = BytesStart::new(tag.as_str());
        for (prefix, uri) in &bindings {
            match prefix {
                Some(prefix) => {
                    start.push_attribute((format!("xmlns:{prefix}").as_str(), uri.as_str()))
                }
                None => start.push_attribute(("xmlns", uri.as_str())),
            }
        }
        for (key, value) in &rendered {
            start.push_attribute((key.as_str(), *value));
        }
        self.write_event(Event::Start(start))?;

        self.open.push(OpenElement {
            name,
            tag,
            bindings,
        });
        Ok(())
    }
}

impl XmlEventWriter<BufWriter<File>> {
    /// Create a file for writing
    pub fn create(path: impl AsRef<Path>, config: XmlConfig) -> XmlResult<Self> {
        let file = File::create(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Created XML file");
        Ok(Self::with_config(BufWriter::new(file), config))
    }
}

impl<W: Write> EventSink for XmlEventWriter<W> {
    type Error = XmlError;

    fn add(&mut self, event: XmlEvent) -> XmlResult<()> {
        trace!(?event, "Writing XML event");
        self.events_written += 1;

        if let XmlEvent::Namespace { prefix, uri } = event {
            return match &mut self.pending {
                Some(pending) => {
                    pending.bindings.retain(|(p, _)| *p != prefix);
                    pending.bindings.push((prefix, uri));
                    Ok(())
                }
                None => Err(XmlError::write(format!(
                    "namespace declaration for '{uri}' outside a start tag"
                ))),
            };
        }

        self.write_declaration()?;
        self.flush_pending()?;

        match event {
            XmlEvent::StartElement { name, attributes } => {
                self.pending = Some(PendingStart {
                    name,
                    attributes,
                    bindings: Vec::new(),
                });
            }
            XmlEvent::EndElement { name } => {
                let open = self.open.pop().ok_or_else(|| wps_ir::Error::UnexpectedEnd {
                    found: name.to_string(),
                })?;
                if open.name != name {
                    let expected = open.name.to_string();
                    return Err(wps_ir::Error::mismatched_end(expected, name.to_string()).into());
                }
                self.write_event(Event::End(BytesEnd::new(open.tag)))?;
            }
            XmlEvent::Characters(text) => {
                self.write_event(Event::Text(BytesText::new(&text)))?;
            }
            XmlEvent::Comment(text) => {
                self.write_event(Event::Comment(BytesText::from_escaped(text)))?;
            }
            XmlEvent::Namespace { .. } => {}
        }
        Ok(())
    }

    fn finish(&mut self) -> XmlResult<()> {
        self.flush_pending()?;
        if !self.open.is_empty() {
            return Err(wps_ir::Error::Truncated {
                open: self.open.len(),
            }
            .into());
        }
        self.writer.get_mut().flush()?;
        debug!(events = self.events_written, "Finished writing XML document");
        Ok(())
    }
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}
