//! Read-direction stream rewriter

use crate::rewrite::Rewriter;
use crate::stats::TranslationStats;
use tracing::debug;
use wps_ir::{EventSource, Version, XmlEvent};
use wps_translation::{ContextStack, Direction, TranslationTable};

/// Pull-side rewriter from a wire vocabulary to canonical names.
///
/// Wraps any [`EventSource`] and translates each event exactly once, at the
/// moment it is pulled from the underlying source. `peek` pulls and
/// translates into a one-slot lookahead that the next `next_event` hands
/// out, so peeking any number of times neither translates twice nor pushes
/// the context stack twice. Errors of the underlying source come out as
/// they went in.
#[derive(Debug)]
pub struct TransformingReader<'t, S> {
    source: S,
    version: Version,
    rewriter: Rewriter<'t>,
    lookahead: Option<XmlEvent>,
    exhausted: bool,
}

impl<'t, S: EventSource> TransformingReader<'t, S> {
    pub fn new(source: S, table: &'t TranslationTable, version: Version) -> Self {
        Self {
            source,
            version,
            rewriter: Rewriter::new(table, Direction::Import, version),
            lookahead: None,
            exhausted: false,
        }
    }

    /// Version of the stream being read
    pub fn version(&self) -> Version {
        self.version
    }

    /// Nesting depth of the translated prefix of the stream
    pub fn depth(&self) -> usize {
        self.rewriter.context().depth()
    }

    pub fn context(&self) -> &ContextStack {
        self.rewriter.context()
    }

    pub fn stats(&self) -> TranslationStats {
        self.rewriter.stats()
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Pull one event from the source and translate it
    fn pull(&mut self) -> Result<Option<XmlEvent>, S::Error> {
        match self.source.next_event()? {
            Some(event) => Ok(Some(self.rewriter.translate(event))),
            None => {
                if !self.exhausted {
                    self.exhausted = true;
                    let stats = self.rewriter.stats();
                    debug!(
                        version = %self.version,
                        events = stats.events,
                        elements_renamed = stats.elements_renamed,
                        attributes_renamed = stats.attributes_renamed,
                        namespaces_renamed = stats.namespaces_renamed,
                        depth = self.depth(),
                        "Finished read translation"
                    );
                }
                Ok(None)
            }
        }
    }
}

impl<S: EventSource> EventSource for TransformingReader<'_, S> {
    type Error = S::Error;

    fn has_next(&mut self) -> Result<bool, Self::Error> {
        if self.lookahead.is_some() {
            return Ok(true);
        }
        self.source.has_next()
    }

    fn peek(&mut self) -> Result<Option<&XmlEvent>, Self::Error> {
        if self.lookahead.is_none() {
            self.lookahead = self.pull()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>, Self::Error> {
        match self.lookahead.take() {
            Some(event) => Ok(Some(event)),
            None => self.pull(),
        }
    }
}
