//! Event stream traits
//!
//! `EventSource` is the pull side (with one event of lookahead through
//! [`EventSource::peek`]), `EventSink` the push side. Both carry their own
//! error type so that failures of the underlying reader or writer reach the
//! caller unchanged through any adapter stacked on top.

use crate::event::XmlEvent;
use std::collections::VecDeque;

/// Pull-based source of XML events
pub trait EventSource {
    /// Failure type of the underlying reader
    type Error;

    /// Whether another event is available
    fn has_next(&mut self) -> Result<bool, Self::Error> {
        Ok(self.peek()?.is_some())
    }

    /// Look at the next event without consuming it
    fn peek(&mut self) -> Result<Option<&XmlEvent>, Self::Error>;

    /// Consume the next event
    fn next_event(&mut self) -> Result<Option<XmlEvent>, Self::Error>;
}

/// Push-based sink of XML events
pub trait EventSink {
    /// Failure type of the underlying writer
    type Error;

    /// Accept one event
    fn add(&mut self, event: XmlEvent) -> Result<(), Self::Error>;

    /// Accept every event of `events`, in order
    fn add_all<I>(&mut self, events: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = XmlEvent>,
        Self: Sized,
    {
        for event in events {
            self.add(event)?;
        }
        Ok(())
    }

    /// Flush anything still buffered
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    type Error = S::Error;

    fn has_next(&mut self) -> Result<bool, Self::Error> {
        (**self).has_next()
    }

    fn peek(&mut self) -> Result<Option<&XmlEvent>, Self::Error> {
        (**self).peek()
    }

    fn next_event(&mut self) -> Result<Option<XmlEvent>, Self::Error> {
        (**self).next_event()
    }
}

impl<K: EventSink + ?Sized> EventSink for &mut K {
    type Error = K::Error;

    fn add(&mut self, event: XmlEvent) -> Result<(), Self::Error> {
        (**self).add(event)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}

/// Move every remaining event from `source` into `sink`.
///
/// Returns the number of events moved. The sink is not finished.
pub fn pump<S, K, E>(source: &mut S, sink: &mut K) -> Result<usize, E>
where
    S: EventSource,
    K: EventSink,
    E: From<S::Error> + From<K::Error>,
{
    let mut count = 0;
    while let Some(event) = source.next_event()? {
        sink.add(event)?;
        count += 1;
    }
    Ok(count)
}

/// In-memory event source
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    events: VecDeque<XmlEvent>,
}

impl VecSource {
    pub fn new(events: impl IntoIterator<Item = XmlEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Number of events not yet consumed
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for VecSource {
    type Error = crate::Error;

    fn has_next(&mut self) -> crate::Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn peek(&mut self) -> crate::Result<Option<&XmlEvent>> {
        Ok(self.events.front())
    }

    fn next_event(&mut self) -> crate::Result<Option<XmlEvent>> {
        Ok(self.events.pop_front())
    }
}

/// In-memory event sink
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Vec<XmlEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<XmlEvent> {
        self.events
    }
}

impl EventSink for VecSink {
    type Error = crate::Error;

    fn add(&mut self, event: XmlEvent) -> crate::Result<()> {
        self.events.push(event);
        Ok(())
    }
}
