//! Event consumer that serializes events as JSON text.
//!
//! [`JsonWriter`] drives a `serde_json` [`Formatter`], so output layout matches what
//! `serde_json` itself produces: [`CompactFormatter`] for minified output and
//! [`PrettyFormatter`] for indented output.
//!
//! The writer trusts the event grammar it receives. Member and element counts on
//! close events are ignored for output.

use std::{io, ops::ControlFlow};

use serde_json::ser::{CharEscape, CompactFormatter, Formatter, PrettyFormatter};

use crate::event::{Event, Handler};

/// Position of the writer inside one open container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Frame {
    Array { first: bool },
    Object { first: bool },
}

/// [`Handler`] that writes JSON text to `W`.
///
/// When the underlying writer fails, the error is kept and every later event is
/// answered with [`ControlFlow::Break`]. Retrieve it with [`JsonWriter::take_error`].
pub struct JsonWriter<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    frames: Vec<Frame>,
    root_written: bool,
    error: Option<io::Error>,
}

impl<W: io::Write> JsonWriter<W> {
    /// Creates a writer producing compact output.
    pub fn new(writer: W) -> Self {
        Self::with_formatter(writer, CompactFormatter)
    }
}

impl<W: io::Write> JsonWriter<W, PrettyFormatter<'static>> {
    /// Creates a writer producing output indented with two spaces.
    pub fn pretty(writer: W) -> Self {
        Self::with_formatter(writer, PrettyFormatter::new())
    }
}

impl<W: io::Write, F: Formatter> JsonWriter<W, F> {
    /// Creates a writer using `formatter` for layout.
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Self {
            writer,
            formatter,
            frames: Vec::new(),
            root_written: false,
            error: None,
        }
    }

    /// Returns `true` once a complete root value has been written.
    pub fn is_complete(&self) -> bool {
        self.root_written && self.frames.is_empty()
    }

    /// Takes the I/O error that stopped the writer, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// Forgets all document state so the writer can start a new document.
    ///
    /// Bytes already written to `W` are untouched.
    pub fn reset(&mut self) {
        self.frames.clear();
        self.root_written = false;
        self.error = None;
    }

    /// Shared access to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Exclusive access to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Releases the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn write_event(&mut self, event: Event<'_>) -> io::Result<()> {
        match event {
            Event::Key(name) => {
                let Some(Frame::Object { first }) = self.frames.last_mut() else {
                    return Err(misplaced("member name outside an object"));
                };
                let is_first = std::mem::replace(first, false);
                self.formatter
                    .begin_object_key(&mut self.writer, is_first)?;
                write_escaped_str(&mut self.writer, &mut self.formatter, name)?;
                self.formatter.end_object_key(&mut self.writer)?;
                self.formatter.begin_object_value(&mut self.writer)
            }
            Event::StartObject => {
                self.before_value()?;
                self.formatter.begin_object(&mut self.writer)?;
                self.frames.push(Frame::Object { first: true });
                Ok(())
            }
            Event::StartArray => {
                self.before_value()?;
                self.formatter.begin_array(&mut self.writer)?;
                self.frames.push(Frame::Array { first: true });
                Ok(())
            }
            Event::EndObject(_) => {
                let Some(Frame::Object { .. }) = self.frames.pop() else {
                    return Err(misplaced("object end without a matching start"));
                };
                self.formatter.end_object(&mut self.writer)?;
                self.after_value()
            }
            Event::EndArray(_) => {
                let Some(Frame::Array { .. }) = self.frames.pop() else {
                    return Err(misplaced("array end without a matching start"));
                };
                self.formatter.end_array(&mut self.writer)?;
                self.after_value()
            }
            scalar => {
                self.before_value()?;
                self.write_scalar(scalar)?;
                self.after_value()
            }
        }
    }

    fn write_scalar(&mut self, event: Event<'_>) -> io::Result<()> {
        let w = &mut self.writer;
        let f = &mut self.formatter;
        match event {
            Event::Null => f.write_null(w),
            Event::Bool(b) => f.write_bool(w, b),
            Event::Int(i) => f.write_i32(w, i),
            Event::UInt(u) => f.write_u32(w, u),
            Event::Int64(i) => f.write_i64(w, i),
            Event::UInt64(u) => f.write_u64(w, u),
            Event::Double(d) if d.is_finite() => f.write_f64(w, d),
            Event::Double(_) => f.write_null(w),
            Event::RawNumber(raw) => f.write_number_str(w, raw),
            Event::String(s) => write_escaped_str(w, f, s),
            Event::StartObject
            | Event::Key(_)
            | Event::EndObject(_)
            | Event::StartArray
            | Event::EndArray(_) => Err(misplaced("structural event written as a scalar")),
        }
    }

    fn before_value(&mut self) -> io::Result<()> {
        match self.frames.last_mut() {
            Some(Frame::Array { first }) => {
                let is_first = std::mem::replace(first, false);
                self.formatter
                    .begin_array_value(&mut self.writer, is_first)
            }
            // The key already opened the member value.
            Some(Frame::Object { .. }) => Ok(()),
            None if self.root_written => Err(misplaced("more than one root value")),
            None => Ok(()),
        }
    }

    fn after_value(&mut self) -> io::Result<()> {
        match self.frames.last() {
            Some(Frame::Array { .. }) => self.formatter.end_array_value(&mut self.writer),
            Some(Frame::Object { .. }) => self.formatter.end_object_value(&mut self.writer),
            None => {
                self.root_written = true;
                Ok(())
            }
        }
    }
}

impl<W: io::Write, F: Formatter> Handler for JsonWriter<W, F> {
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()> {
        if self.error.is_some() {
            return ControlFlow::Break(());
        }
        match self.write_event(event) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                tracing::debug!(error = %err, "json writer rejected event");
                self.error = Some(err);
                ControlFlow::Break(())
            }
        }
    }
}

impl<W, F> std::fmt::Debug for JsonWriter<W, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonWriter")
            .field("depth", &self.frames.len())
            .field("root_written", &self.root_written)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

fn misplaced(what: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, what.to_owned())
}

/// Writes `value` as a quoted JSON string, escaping what JSON requires.
fn write_escaped_str<W, F>(writer: &mut W, formatter: &mut F, value: &str) -> io::Result<()>
where
    W: io::Write + ?Sized,
    F: Formatter + ?Sized,
{
    formatter.begin_string(writer)?;
    let bytes = value.as_bytes();
    let mut start = 0;
    for (index, &byte) in bytes.iter().enumerate() {
        let escape = match byte {
            b'"' => CharEscape::Quote,
            b'\\' => CharEscape::ReverseSolidus,
            b'\x08' => CharEscape::Backspace,
            b'\x0c' => CharEscape::FormFeed,
            b'\n' => CharEscape::LineFeed,
            b'\r' => CharEscape::CarriageReturn,
            b'\t' => CharEscape::Tab,
            0x00..=0x1f => CharEscape::AsciiControl(byte),
            _ => continue,
        };
        if start < index {
            formatter.write_string_fragment(writer, &value[start..index])?;
        }
        formatter.write_char_escape(writer, escape)?;
        start = index + 1;
    }
    if start < bytes.len() {
        formatter.write_string_fragment(writer, &value[start..])?;
    }
    formatter.end_string(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{OwnedEvent, replay};

    fn compact(events: &[OwnedEvent]) -> String {
        let mut writer = JsonWriter::new(Vec::new());
        assert_eq!(replay(events, &mut writer), ControlFlow::Continue(()));
        assert!(writer.is_complete());
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn writes_nested_containers_compactly() {
        let events = [
            OwnedEvent::StartObject,
            OwnedEvent::Key("a".into()),
            OwnedEvent::StartArray,
            OwnedEvent::UInt(1),
            OwnedEvent::Int(-2),
            OwnedEvent::StartObject,
            OwnedEvent::EndObject(0),
            OwnedEvent::EndArray(3),
            OwnedEvent::Key("b".into()),
            OwnedEvent::Null,
            OwnedEvent::EndObject(2),
        ];
        assert_eq!(compact(&events), r#"{"a":[1,-2,{}],"b":null}"#);
    }

    #[test]
    fn writes_every_scalar_kind() {
        let events = [
            OwnedEvent::StartArray,
            OwnedEvent::Bool(false),
            OwnedEvent::Int64(i64::MIN),
            OwnedEvent::UInt64(u64::MAX),
            OwnedEvent::Double(0.5),
            OwnedEvent::Double(f64::NAN),
            OwnedEvent::RawNumber("1e400".into()),
            OwnedEvent::String("x".into()),
            OwnedEvent::EndArray(7),
        ];
        assert_eq!(
            compact(&events),
            r#"[false,-9223372036854775808,18446744073709551615,0.5,null,1e400,"x"]"#
        );
    }

    #[test]
    fn escapes_strings_and_keys() {
        let events = [
            OwnedEvent::StartObject,
            OwnedEvent::Key("q\"k".into()),
            OwnedEvent::String("tab\there\u{1}\\ é".into()),
            OwnedEvent::EndObject(1),
        ];
        assert_eq!(
            compact(&events),
            "{\"q\\\"k\":\"tab\\there\\u0001\\\\ \u{e9}\"}"
        );
    }

    #[test]
    fn writes_pretty_output() {
        let events = [
            OwnedEvent::StartObject,
            OwnedEvent::Key("a".into()),
            OwnedEvent::StartArray,
            OwnedEvent::UInt(1),
            OwnedEvent::EndArray(1),
            OwnedEvent::Key("b".into()),
            OwnedEvent::StartObject,
            OwnedEvent::EndObject(0),
            OwnedEvent::EndObject(2),
        ];
        let mut writer = JsonWriter::pretty(Vec::new());
        assert_eq!(replay(&events, &mut writer), ControlFlow::Continue(()));
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "{\n  \"a\": [\n    1\n  ],\n  \"b\": {}\n}");
    }

    #[test]
    fn rejects_second_root_value() {
        let mut writer = JsonWriter::new(Vec::new());
        assert_eq!(writer.handle(Event::Null), ControlFlow::Continue(()));
        assert_eq!(writer.handle(Event::Null), ControlFlow::Break(()));
        let err = writer.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn reset_allows_a_new_document() {
        let mut writer = JsonWriter::new(Vec::new());
        let _ = writer.handle(Event::UInt(1));
        writer.reset();
        assert_eq!(writer.handle(Event::UInt(2)), ControlFlow::Continue(()));
        assert_eq!(writer.get_ref().as_slice(), b"12");
    }

    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn keeps_io_error_and_stays_stopped() {
        let mut writer = JsonWriter::new(FailingWriter);
        assert_eq!(writer.handle(Event::StartArray), ControlFlow::Break(()));
        assert_eq!(writer.handle(Event::Null), ControlFlow::Break(()));
        let err = writer.take_error().unwrap();
        assert_eq!(err.to_string(), "disk full");
    }
}
