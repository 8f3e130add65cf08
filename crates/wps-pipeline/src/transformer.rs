//! The legacy transformer facade
//!
//! Entry points used by document binders and by the CLI. Every top-level
//! call establishes its own [`Version`] (sniffed on read, requested on
//! write) and hands it to the rewriters it creates, so concurrent calls on
//! one shared transformer never see each other's version.

use crate::config::TransformerConfig;
use crate::reader::TransformingReader;
use crate::sniffer::VersionSniffer;
use crate::stats::TranslationStats;
use crate::writer::TransformingWriter;
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};
use wps_adapter_xml::XmlAdapter;
use wps_ir::{
    Attribute, Document, EventSink, EventSource, Version, XmlEvent, build_tree, emit_tree, pump,
};
use wps_model::WpsDocument;
use wps_translation::{RuleSet, TranslationTable};

/// A document bound from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadDocument {
    /// Vocabulary the document was written in
    pub version: Version,
    pub document: WpsDocument,
    pub stats: TranslationStats,
}

/// Outcome of translating or converting one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslationReport {
    pub source: Version,
    pub target: Version,
    pub read: TranslationStats,
    pub written: TranslationStats,
}

/// Reads and writes WPS documents in either vocabulary through one
/// canonical, current-named form
#[derive(Debug, Clone)]
pub struct LegacyTransformer {
    table: TranslationTable,
    sniffer: VersionSniffer,
    adapter: XmlAdapter,
    config: TransformerConfig,
}

impl Default for LegacyTransformer {
    fn default() -> Self {
        Self::with_table(TranslationTable::wps().clone(), TransformerConfig::default())
    }
}

impl LegacyTransformer {
    /// A transformer over the built-in rule list with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transformer from configuration, loading its extra rule file
    pub fn from_config(config: TransformerConfig) -> Result<Self> {
        let table = match &config.rules_file {
            Some(path) => {
                let mut rules = RuleSet::wps();
                rules.extend(RuleSet::parse_file(path)?);
                info!(path = %path.display(), rules = rules.rules.len(), "Loaded extra rules");
                TranslationTable::from_rules(&rules)?
            }
            None => TranslationTable::wps().clone(),
        };
        Ok(Self::with_table(table, config))
    }

    /// Build a transformer over an explicit rule set
    pub fn with_rules(rules: &RuleSet, config: TransformerConfig) -> Result<Self> {
        Ok(Self::with_table(TranslationTable::from_rules(rules)?, config))
    }

    fn with_table(table: TranslationTable, config: TransformerConfig) -> Self {
        let sniffer = VersionSniffer::new(
            config.service.as_str(),
            config.legacy_token.as_str(),
            config.current_token.as_str(),
        );
        let adapter = XmlAdapter::new().with_config(config.xml_config());
        Self {
            table,
            sniffer,
            adapter,
            config,
        }
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    pub fn sniffer(&self) -> &VersionSniffer {
        &self.sniffer
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Wrap `source` in a read rewriter for the version its root declares
    pub fn translate_for_read<S: EventSource>(
        &self,
        mut source: S,
    ) -> std::result::Result<TransformingReader<'_, S>, S::Error> {
        let version = self.sniffer.sniff(&mut source)?;
        debug!(%version, table = self.table.name(), "Translating for read");
        Ok(TransformingReader::new(source, &self.table, version))
    }

    /// Wrap `sink` in a write rewriter producing `version`
    pub fn translate_for_write<K: EventSink>(
        &self,
        sink: K,
        version: Version,
    ) -> TransformingWriter<'_, K> {
        debug!(%version, table = self.table.name(), "Translating for write");
        TransformingWriter::new(sink, &self.table, version)
    }

    /// Detect the vocabulary of an XML document
    pub fn sniff<R: BufRead>(&self, input: R) -> Result<Version> {
        let mut reader = self.adapter.reader(input);
        Ok(self.sniffer.sniff(&mut reader)?)
    }

    /// Read a document in either vocabulary into a canonical element tree
    pub fn read_tree<R: BufRead>(&self, input: R) -> Result<Document> {
        Ok(self.read_canonical(input)?.0)
    }

    /// Read and bind a document in either vocabulary
    pub fn read_document<R: BufRead>(&self, input: R) -> Result<ReadDocument> {
        let (tree, stats) = self.read_canonical(input)?;
        let document = WpsDocument::decode(tree.version, &tree.root)?;
        Ok(ReadDocument {
            version: tree.version,
            document,
            stats,
        })
    }

    fn read_canonical<R: BufRead>(&self, input: R) -> Result<(Document, TranslationStats)> {
        let mut reader = self.translate_for_read(self.adapter.reader(input))?;
        let root = build_tree(&mut reader)?;
        if let Some(event) = reader.next_event()? {
            return Err(Error::transform(
                "read",
                format!("unexpected {event:?} after the root element"),
            ));
        }
        Ok((Document::new(root, reader.version()), reader.stats()))
    }

    /// Encode and write a document in the requested vocabulary
    pub fn write_document<W: Write>(
        &self,
        document: &WpsDocument,
        version: Version,
        output: W,
    ) -> Result<TranslationStats> {
        let root = document.encode(version);
        let mut writer = self.translate_for_write(self.adapter.writer(output), version);
        emit_tree(&root, &mut writer)?;
        writer.finish()?;
        Ok(writer.stats())
    }

    /// Rewrite a document into `target` at the event level, without binding it.
    ///
    /// A document already in `target` is copied event for event; it never
    /// goes through the import and export tables.
    pub fn translate<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
        target: Version,
    ) -> Result<TranslationReport> {
        let mut events = self.adapter.reader(input);
        let source = self.sniffer.sniff(&mut events)?;
        let mut sink = self.adapter.writer(output);

        let report = if source == target {
            let copied = pump::<_, _, Error>(&mut events, &mut sink)?;
            sink.finish()?;
            let stats = TranslationStats {
                events: copied,
                ..TranslationStats::new()
            };
            TranslationReport {
                source,
                target,
                read: stats,
                written: stats,
            }
        } else {
            let mut reader = TransformingReader::new(events, &self.table, source);
            let mut writer = self.translate_for_write(sink, target);

            let mut root = true;
            while let Some(mut event) = reader.next_event()? {
                if root && event.is_start() {
                    self.stamp_version(&mut event, source, target);
                    root = false;
                }
                writer.add(event)?;
            }
            writer.finish()?;
            TranslationReport {
                source,
                target,
                read: reader.stats(),
                written: writer.stats(),
            }
        };

        debug!(%source, %target, events = report.read.events, "Translated document");
        Ok(report)
    }

    /// Bind a document in either vocabulary and write it in `target`
    pub fn convert<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
        target: Version,
    ) -> Result<TranslationReport> {
        let read = self.read_document(input)?;
        let written = self.write_document(&read.document, target, output)?;
        debug!(
            source = %read.version,
            %target,
            root = read.document.root_name(),
            "Converted document"
        );
        Ok(TranslationReport {
            source: read.version,
            target,
            read: read.stats,
            written,
        })
    }

    pub fn sniff_file(&self, path: &Path) -> Result<Version> {
        self.sniff(open(path)?)
    }

    pub fn read_file(&self, path: &Path) -> Result<ReadDocument> {
        self.read_document(open(path)?)
    }

    pub fn read_tree_file(&self, path: &Path) -> Result<Document> {
        let tree = self.read_tree(open(path)?)?;
        Ok(tree.with_source(path.display().to_string()))
    }

    pub fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        target: Version,
    ) -> Result<TranslationReport> {
        self.translate(open(input)?, create(output)?, target)
    }

    pub fn convert_file(
        &self,
        input: &Path,
        output: &Path,
        target: Version,
    ) -> Result<TranslationReport> {
        self.convert(open(input)?, create(output)?, target)
    }

    /// Point the root `version` attribute at the vocabulary being written.
    /// A legacy target without any declaration gets `service` and `version`.
    fn stamp_version(&self, root: &mut XmlEvent, source: Version, target: Version) {
        if source == target {
            return;
        }
        let XmlEvent::StartElement { attributes, .. } = root else {
            return;
        };

        let declared = attributes
            .iter_mut()
            .find(|a| a.name.is_unqualified() && a.name.local == "version");
        if let Some(declared) = declared {
            declared.value = target.wire_version().to_string();
            return;
        }
        if target.is_legacy() {
            if !attributes.iter().any(|a| a.name.local == "service") {
                let service = self.config.service.as_str();
                attributes.push(Attribute::unqualified("service", service));
            }
            attributes.push(Attribute::unqualified("version", target.wire_version()));
        }
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| Error::io("open", path.display().to_string(), e.to_string()))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| Error::io("create", path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wps_model::{Capabilities, ProcessSummary};

    const LEGACY_CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wps:Capabilities service="WPS" version="1.0.0"
    xmlns:wps="http://www.opengis.net/wps/1.0.0"
    xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:ServiceIdentification>
    <ows:Title>Demo</ows:Title>
  </ows:ServiceIdentification>
  <wps:ProcessOfferings>
    <wps:Process wps:processVersion="1.0">
      <ows:Identifier>buffer</ows:Identifier>
      <ows:Title>Buffer</ows:Title>
    </wps:Process>
  </wps:ProcessOfferings>
</wps:Capabilities>"#;

    #[test]
    fn test_read_legacy_capabilities() {
        let transformer = LegacyTransformer::new();
        let read = transformer.read_document(LEGACY_CAPABILITIES.as_bytes()).unwrap();

        assert_eq!(read.version, Version::Legacy);
        let WpsDocument::Capabilities(capabilities) = read.document else {
            panic!("expected capabilities");
        };
        assert_eq!(capabilities.title, "Demo");
        let process = capabilities.process("buffer").unwrap();
        assert_eq!(process.process_version.as_deref(), Some("1.0"));
        assert!(read.stats.elements_renamed > 0);
    }

    #[test]
    fn test_read_tree_uses_canonical_names() {
        let transformer = LegacyTransformer::new();
        let tree = transformer.read_tree(LEGACY_CAPABILITIES.as_bytes()).unwrap();

        assert_eq!(tree.version, Version::Legacy);
        assert_eq!(tree.root_name(), "Capabilities");
        assert!(tree.root.find_child("Contents").is_some());
        assert!(tree.root.find_child("ProcessOfferings").is_none());
    }

    #[test]
    fn test_translate_stamps_target_version() {
        let transformer = LegacyTransformer::new();
        let mut output = Vec::new();
        let report = transformer
            .translate(LEGACY_CAPABILITIES.as_bytes(), &mut output, Version::Current)
            .unwrap();
        assert_eq!(report.source, Version::Legacy);
        assert!(report.written.is_identity());

        let xml = String::from_utf8(output).unwrap();
        assert!(xml.contains(r#"version="2.0.0""#));
        assert!(xml.contains("http://www.opengis.net/wps/2.0"));
        assert!(xml.contains("Contents"));
        assert_eq!(transformer.sniff(xml.as_bytes()).unwrap(), Version::Current);
    }

    #[test]
    fn test_write_then_read_legacy() {
        let transformer = LegacyTransformer::new();
        let capabilities = Capabilities::new("Demo")
            .with_process(ProcessSummary::new("buffer", "Buffer").with_version("2"));
        let document = WpsDocument::from(capabilities);

        let mut output = Vec::new();
        let stats = transformer
            .write_document(&document, Version::Legacy, &mut output)
            .unwrap();
        assert!(stats.elements_renamed > 0);

        let xml = String::from_utf8(output).unwrap();
        assert!(xml.contains("ProcessOfferings"));
        assert!(!xml.contains("ProcessSummary"));

        let read = transformer.read_document(xml.as_bytes()).unwrap();
        assert_eq!(read.version, Version::Legacy);
        assert_eq!(read.document, document);
    }
}
