//! Event translation shared by the read and write rewriters

use crate::stats::TranslationStats;
use tracing::{debug, trace};
use wps_ir::{Attribute, QName, Version, XmlEvent};
use wps_translation::{ContextStack, Direction, TranslationTable};

/// One streaming translation pass.
///
/// The context stack holds the local names of the stream being translated,
/// before renaming, so lookups stay keyed on the vocabulary the rules were
/// inverted for. When the pass does not rename (a current-version stream)
/// the stack is still maintained.
#[derive(Debug)]
pub(crate) struct Rewriter<'t> {
    table: &'t TranslationTable,
    direction: Direction,
    renaming: bool,
    context: ContextStack,
    stats: TranslationStats,
}

impl<'t> Rewriter<'t> {
    pub(crate) fn new(table: &'t TranslationTable, direction: Direction, version: Version) -> Self {
        Self {
            table,
            direction,
            renaming: version.is_legacy(),
            context: ContextStack::new(),
            stats: TranslationStats::new(),
        }
    }

    pub(crate) fn context(&self) -> &ContextStack {
        &self.context
    }

    pub(crate) fn stats(&self) -> TranslationStats {
        self.stats
    }

    /// Count an event that bypassed translation
    pub(crate) fn count_passthrough(&mut self) {
        self.stats.events += 1;
    }

    pub(crate) fn translate(&mut self, event: XmlEvent) -> XmlEvent {
        self.stats.events += 1;
        match event {
            XmlEvent::StartElement { name, attributes } => {
                let renamed = self.element(&name, Position::Opening);
                let attributes = attributes.into_iter().map(|a| self.attribute(a)).collect();
                self.context.push(name.local);
                XmlEvent::StartElement {
                    name: renamed,
                    attributes,
                }
            }
            XmlEvent::EndElement { name } => {
                if self.context.pop().is_none() {
                    debug!(
                        element = %name,
                        direction = %self.direction,
                        "End element with no open context"
                    );
                }
                XmlEvent::EndElement {
                    name: self.element(&name, Position::Closing),
                }
            }
            XmlEvent::Namespace { prefix, uri } if self.renaming => {
                let renamed = self.table.rename_ns(self.direction, &uri).to_string();
                if renamed != uri {
                    self.stats.namespaces_renamed += 1;
                    trace!(from = %uri, to = %renamed, "Renamed namespace declaration");
                }
                XmlEvent::Namespace {
                    prefix,
                    uri: renamed,
                }
            }
            other => other,
        }
    }

    /// Rename an element with the innermost open element as its parent. For a
    /// closing tag the element itself has already been popped.
    fn element(&mut self, name: &QName, position: Position) -> QName {
        if !self.renaming {
            return name.clone();
        }
        let parent = self.context.peek_parent();
        let renamed = self.table.translate_element(self.direction, parent, name);
        if renamed != *name {
            if position == Position::Opening {
                self.stats.elements_renamed += 1;
            }
            trace!(
                from = %name,
                to = %renamed,
                parent = parent.unwrap_or(""),
                direction = %self.direction,
                "Renamed element"
            );
        }
        renamed
    }

    fn attribute(&mut self, attribute: Attribute) -> Attribute {
        if !self.renaming || attribute.name.is_unqualified() {
            return attribute;
        }
        let name = self.table.translate_attribute(self.direction, &attribute.name);
        if name != attribute.name {
            self.stats.attributes_renamed += 1;
        }
        Attribute {
            name,
            value: attribute.value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    Opening,
    Closing,
}
