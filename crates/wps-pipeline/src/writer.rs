//! Write-direction stream rewriter

use crate::rewrite::Rewriter;
use crate::stats::TranslationStats;
use tracing::debug;
use wps_ir::{EventSink, Version, XmlEvent};
use wps_translation::{Direction, TranslationTable};

/// Push-side rewriter from canonical names to a wire vocabulary.
///
/// Each added event is rewritten and forwarded to the wrapped sink before
/// `add` returns. For [`Version::Current`] the canonical names already are
/// the wire names and events go through untouched.
#[derive(Debug)]
pub struct TransformingWriter<'t, K> {
    sink: K,
    version: Version,
    rewriter: Rewriter<'t>,
}

impl<'t, K: EventSink> TransformingWriter<'t, K> {
    pub fn new(sink: K, table: &'t TranslationTable, version: Version) -> Self {
        Self {
            sink,
            version,
            rewriter: Rewriter::new(table, Direction::Export, version),
        }
    }

    /// Version being written
    pub fn version(&self) -> Version {
        self.version
    }

    /// Nesting depth of the events added so far, tracked for legacy output only
    pub fn depth(&self) -> usize {
        self.rewriter.context().depth()
    }

    pub fn stats(&self) -> TranslationStats {
        self.rewriter.stats()
    }

    pub fn get_ref(&self) -> &K {
        &self.sink
    }

    pub fn into_inner(self) -> K {
        self.sink
    }
}

impl<K: EventSink> EventSink for TransformingWriter<'_, K> {
    type Error = K::Error;

    fn add(&mut self, event: XmlEvent) -> Result<(), Self::Error> {
        if self.version == Version::Current {
            self.rewriter.count_passthrough();
            return self.sink.add(event);
        }
        let event = self.rewriter.translate(event);
        self.sink.add(event)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        let stats = self.rewriter.stats();
        debug!(
            version = %self.version,
            events = stats.events,
            elements_renamed = stats.elements_renamed,
            attributes_renamed = stats.attributes_renamed,
            namespaces_renamed = stats.namespaces_renamed,
            "Finished write translation"
        );
        self.sink.finish()
    }
}
