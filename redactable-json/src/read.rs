//! Event producer backed by `serde_json`'s streaming deserializer.
//!
//! The deserializer is driven through a `serde` visitor that turns every token into
//! an [`Event`] and pushes it into a [`Handler`] immediately. No value is
//! materialized: strings are handed out borrowed (or from the deserializer's scratch
//! buffer when they contain escapes), and containers exist only as their open and
//! close events.
//!
//! Exactly one root value is accepted. Trailing whitespace is allowed; anything
//! else after the root value is a syntax error.
//!
//! Integers that fit in 64 bits become `Int`, `UInt`, `Int64` or `UInt64`. Every
//! other number (fractions, exponents, `-0`, integers beyond 64 bits) is forwarded
//! as [`Event::RawNumber`] with the scanned text, so no precision is lost. The
//! scanner spells exponents as `e+N` or `e-N`.

use std::{fmt, io, ops::ControlFlow};

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{
    error::{RedactError, Result},
    event::{Event, Handler},
};

/// Message carried through `serde` when a handler stops the stream.
const ABORTED: &str = "event stream aborted by handler";

/// Member name `serde_json` uses to hand out a number as its text.
///
/// An object whose first member has this exact name is read as a number, the same
/// way `serde_json::Value` reads it.
const NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Parses `input` and pushes its events into `handler`.
pub fn parse_str<H>(input: &str, handler: &mut H) -> Result<()>
where
    H: Handler + ?Sized,
{
    let mut de = serde_json::Deserializer::from_str(input);
    drive(&mut de, handler, |err| RedactError::located(err, input.as_bytes()))
}

/// Parses UTF-8 JSON from `input` and pushes its events into `handler`.
///
/// Invalid UTF-8 inside strings is a syntax error.
pub fn parse_slice<H>(input: &[u8], handler: &mut H) -> Result<()>
where
    H: Handler + ?Sized,
{
    let mut de = serde_json::Deserializer::from_slice(input);
    drive(&mut de, handler, |err| RedactError::located(err, input))
}

/// Parses JSON from `reader` and pushes its events into `handler`.
///
/// The reader is consumed incrementally; wrap unbuffered sources in a
/// [`std::io::BufReader`]. Syntax errors carry line and column but no byte offset.
pub fn parse_reader<R, H>(reader: R, handler: &mut H) -> Result<()>
where
    R: io::Read,
    H: Handler + ?Sized,
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    drive(&mut de, handler, RedactError::from)
}

/// Runs the deserializer over one document. Parser errors go through `convert`;
/// a handler stop becomes [`RedactError::Aborted`].
fn drive<'de, R, H, C>(
    de: &mut serde_json::Deserializer<R>,
    handler: &mut H,
    convert: C,
) -> Result<()>
where
    R: serde_json::de::Read<'de>,
    H: Handler + ?Sized,
    C: FnOnce(serde_json::Error) -> RedactError,
{
    let mut driver = Driver {
        handler,
        aborted: false,
    };
    let outcome = (&mut driver).deserialize(&mut *de).and_then(|()| de.end());
    match outcome {
        Ok(()) => Ok(()),
        Err(_) if driver.aborted => Err(RedactError::Aborted),
        Err(err) => Err(convert(err)),
    }
}

// =============================================================================
// Driver - serde visitor that forwards tokens as events
// =============================================================================

struct Driver<'h, H: ?Sized> {
    handler: &'h mut H,
    aborted: bool,
}

impl<H: Handler + ?Sized> Driver<'_, H> {
    fn emit<E: de::Error>(&mut self, event: Event<'_>) -> std::result::Result<(), E> {
        match self.handler.handle(event) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => {
                self.aborted = true;
                Err(E::custom(ABORTED))
            }
        }
    }
}

impl<'de, H: Handler + ?Sized> DeserializeSeed<'de> for &mut Driver<'_, H> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, H: Handler + ?Sized> Visitor<'de> for &mut Driver<'_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<(), E> {
        self.emit(Event::Null)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<(), E> {
        self.emit(Event::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<(), E> {
        if let Ok(unsigned) = u64::try_from(v) {
            return self.visit_u64(unsigned);
        }
        match i32::try_from(v) {
            Ok(small) => self.emit(Event::Int(small)),
            Err(_) => self.emit(Event::Int64(v)),
        }
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<(), E> {
        match u32::try_from(v) {
            Ok(small) => self.emit(Event::UInt(small)),
            Err(_) => self.emit(Event::UInt64(v)),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<(), E> {
        self.emit(Event::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.emit(Event::StartArray)?;
        let mut count = 0;
        while seq.next_element_seed(&mut *self)?.is_some() {
            count += 1;
        }
        self.emit(Event::EndArray(count))
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        // `StartObject` waits for the first member name, which may turn out to be
        // the number marker instead.
        let mut count = 0;
        while let Some(member) = map.next_key_seed(KeySeed {
            driver: &mut *self,
            opened: count > 0,
        })? {
            match member {
                Member::Number => return map.next_value_seed(NumberSeed(&mut *self)),
                Member::Key => {
                    map.next_value_seed(&mut *self)?;
                    count += 1;
                }
            }
        }
        if count == 0 {
            self.emit(Event::StartObject)?;
        }
        self.emit(Event::EndObject(count))
    }
}

// =============================================================================
// KeySeed / NumberSeed - object member names and number text
// =============================================================================

/// What the first member name of a map turned out to be.
enum Member {
    Key,
    Number,
}

struct KeySeed<'a, 'h, H: ?Sized> {
    driver: &'a mut Driver<'h, H>,
    /// `StartObject` was already emitted for this map.
    opened: bool,
}

impl<'de, H: Handler + ?Sized> DeserializeSeed<'de> for KeySeed<'_, '_, H> {
    type Value = Member;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<Member, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

impl<'de, H: Handler + ?Sized> Visitor<'de> for KeySeed<'_, '_, H> {
    type Value = Member;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object member name")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Member, E> {
        if !self.opened {
            if v == NUMBER_TOKEN {
                return Ok(Member::Number);
            }
            self.driver.emit(Event::StartObject)?;
        }
        self.driver.emit(Event::Key(v))?;
        Ok(Member::Key)
    }
}

struct NumberSeed<'a, 'h, H: ?Sized>(&'a mut Driver<'h, H>);

impl<'de, H: Handler + ?Sized> DeserializeSeed<'de> for NumberSeed<'_, '_, H> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

impl<'de, H: Handler + ?Sized> Visitor<'de> for NumberSeed<'_, '_, H> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("the text of a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<(), E> {
        self.0.emit(Event::RawNumber(v))
    }
}
