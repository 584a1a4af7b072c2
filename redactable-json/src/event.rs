//! Structural events and the handler contract.
//!
//! This module defines the vocabulary shared by every stage of the pipeline:
//!
//! - [`Event`]: one token of a streamed JSON document, borrowed from the producer
//! - [`Handler`]: the push-side contract every stage implements
//! - [`OwnedEvent`], [`EventRecorder`], [`replay`]: owned forms for recording and
//!   replaying streams
//!
//! The event set is closed. Stages dispatch with a single `match` rather than one
//! callback per event kind.

use std::ops::ControlFlow;

// =============================================================================
// Event - one structural token
// =============================================================================

/// One structural token of a JSON document.
///
/// Text payloads (`String`, `Key`, `RawNumber`) borrow from the producer and are only
/// valid for the duration of a single [`Handler::handle`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event<'a> {
    /// `null`.
    Null,
    /// `true` or `false`.
    Bool(bool),
    /// Negative integer that fits in 32 bits.
    Int(i32),
    /// Non-negative integer that fits in 32 bits.
    UInt(u32),
    /// Negative integer outside the 32-bit range.
    Int64(i64),
    /// Non-negative integer outside the 32-bit range.
    UInt64(u64),
    /// Floating-point number.
    Double(f64),
    /// Number kept in its original textual form.
    RawNumber(&'a str),
    /// String value, unescaped.
    String(&'a str),
    /// Start of an object.
    StartObject,
    /// Object member name, unescaped.
    Key(&'a str),
    /// End of object with the number of members the producer saw.
    EndObject(usize),
    /// Start of an array.
    StartArray,
    /// End of array with the number of elements the producer saw.
    EndArray(usize),
}

impl Event<'_> {
    /// Returns `true` for events that start a value: scalars, `StartObject` and
    /// `StartArray`.
    pub fn is_value(&self) -> bool {
        !matches!(
            self,
            Event::Key(_) | Event::EndObject(_) | Event::EndArray(_)
        )
    }

    /// Returns `true` for `StartObject` and `StartArray`.
    pub fn is_container_start(&self) -> bool {
        matches!(self, Event::StartObject | Event::StartArray)
    }

    /// Returns `true` for `EndObject` and `EndArray`.
    pub fn is_container_end(&self) -> bool {
        matches!(self, Event::EndObject(_) | Event::EndArray(_))
    }

    /// Copies the event into an [`OwnedEvent`].
    pub fn to_owned_event(&self) -> OwnedEvent {
        match *self {
            Event::Null => OwnedEvent::Null,
            Event::Bool(b) => OwnedEvent::Bool(b),
            Event::Int(i) => OwnedEvent::Int(i),
            Event::UInt(u) => OwnedEvent::UInt(u),
            Event::Int64(i) => OwnedEvent::Int64(i),
            Event::UInt64(u) => OwnedEvent::UInt64(u),
            Event::Double(d) => OwnedEvent::Double(d),
            Event::RawNumber(raw) => OwnedEvent::RawNumber(raw.to_owned()),
            Event::String(s) => OwnedEvent::String(s.to_owned()),
            Event::StartObject => OwnedEvent::StartObject,
            Event::Key(k) => OwnedEvent::Key(k.to_owned()),
            Event::EndObject(n) => OwnedEvent::EndObject(n),
            Event::StartArray => OwnedEvent::StartArray,
            Event::EndArray(n) => OwnedEvent::EndArray(n),
        }
    }
}

// =============================================================================
// Handler - push-side contract
// =============================================================================

/// A stage that receives structural events.
///
/// Returning [`ControlFlow::Break`] stops the stream: the producer delivers no
/// further events and reports the abort to its caller.
pub trait Handler {
    /// Processes one event.
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()>;
}

impl<H: Handler + ?Sized> Handler for &mut H {
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()> {
        (**self).handle(event)
    }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()> {
        (**self).handle(event)
    }
}

// =============================================================================
// OwnedEvent / EventRecorder - recording and replay
// =============================================================================

/// Owned counterpart of [`Event`].
#[derive(Clone, Debug, PartialEq)]
pub enum OwnedEvent {
    /// See [`Event::Null`].
    Null,
    /// See [`Event::Bool`].
    Bool(bool),
    /// See [`Event::Int`].
    Int(i32),
    /// See [`Event::UInt`].
    UInt(u32),
    /// See [`Event::Int64`].
    Int64(i64),
    /// See [`Event::UInt64`].
    UInt64(u64),
    /// See [`Event::Double`].
    Double(f64),
    /// See [`Event::RawNumber`].
    RawNumber(String),
    /// See [`Event::String`].
    String(String),
    /// See [`Event::StartObject`].
    StartObject,
    /// See [`Event::Key`].
    Key(String),
    /// See [`Event::EndObject`].
    EndObject(usize),
    /// See [`Event::StartArray`].
    StartArray,
    /// See [`Event::EndArray`].
    EndArray(usize),
}

impl OwnedEvent {
    /// Borrows the event as an [`Event`].
    pub fn as_event(&self) -> Event<'_> {
        match self {
            OwnedEvent::Null => Event::Null,
            OwnedEvent::Bool(b) => Event::Bool(*b),
            OwnedEvent::Int(i) => Event::Int(*i),
            OwnedEvent::UInt(u) => Event::UInt(*u),
            OwnedEvent::Int64(i) => Event::Int64(*i),
            OwnedEvent::UInt64(u) => Event::UInt64(*u),
            OwnedEvent::Double(d) => Event::Double(*d),
            OwnedEvent::RawNumber(raw) => Event::RawNumber(raw),
            OwnedEvent::String(s) => Event::String(s),
            OwnedEvent::StartObject => Event::StartObject,
            OwnedEvent::Key(k) => Event::Key(k),
            OwnedEvent::EndObject(n) => Event::EndObject(*n),
            OwnedEvent::StartArray => Event::StartArray,
            OwnedEvent::EndArray(n) => Event::EndArray(*n),
        }
    }
}

impl From<Event<'_>> for OwnedEvent {
    fn from(event: Event<'_>) -> Self {
        event.to_owned_event()
    }
}

/// Handler that records every event it receives.
///
/// Optionally rejects the event at a given position, which is how callers
/// exercise downstream rejection.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Vec<OwnedEvent>,
    reject_at: Option<usize>,
}

impl EventRecorder {
    /// Creates an empty recorder that accepts every event.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recorder that answers `Break` to the event at index `index`
    /// (0-based). Events before it are recorded; the rejected one is not.
    #[must_use]
    pub fn rejecting_at(index: usize) -> Self {
        Self {
            events: Vec::new(),
            reject_at: Some(index),
        }
    }

    /// Returns the recorded events.
    pub fn events(&self) -> &[OwnedEvent] {
        &self.events
    }

    /// Consumes the recorder and returns the recorded events.
    pub fn into_events(self) -> Vec<OwnedEvent> {
        self.events
    }
}

impl Handler for EventRecorder {
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()> {
        if self.reject_at == Some(self.events.len()) {
            return ControlFlow::Break(());
        }
        self.events.push(event.to_owned_event());
        ControlFlow::Continue(())
    }
}

/// Pushes recorded events into `handler` in order.
///
/// Stops at the first `Break` and returns it.
pub fn replay<'e, H, I>(events: I, handler: &mut H) -> ControlFlow<()>
where
    H: Handler + ?Sized,
    I: IntoIterator<Item = &'e OwnedEvent>,
{
    for event in events {
        handler.handle(event.as_event())?;
    }
    ControlFlow::Continue(())
}
