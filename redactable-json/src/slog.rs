//! Adapters for emitting redacted JSON payloads through `slog`.
//!
//! This module connects [`crate::Redactor`] with `slog` by providing a
//! `slog::Value` implementation that emits the redacted form of a payload.
//!
//! It is responsible for:
//! - Ensuring the logged representation is produced by the redaction pipeline,
//!   never by the original payload.
//! - Avoiding fallible logging APIs: redaction failures are represented as
//!   placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` and does not decide which keys are sensitive.

use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::redactor::Redactor;

/// Marker trait for types whose `slog` integration always emits redacted output.
///
/// This trait requires `slog::Value` so the type can be logged with slog. It is
/// implemented only for wrappers that redact before logging, not for raw payloads.
///
/// ```compile_fail
/// use redactable_json::slog::SlogRedacted;
///
/// fn assert_slog_redacted<T: SlogRedacted>() {}
///
/// assert_slog_redacted::<String>();
/// ```
pub trait SlogRedacted: SlogValue {}

impl<T: SlogRedacted + ?Sized> SlogRedacted for &T {}

/// A JSON payload paired with the redactor that must be applied before logging.
///
/// Redaction runs lazily when the record is serialized, so dropped records cost
/// nothing.
#[derive(Clone, Copy, Debug)]
pub struct RedactedPayload<'a> {
    redactor: &'a Redactor,
    payload: &'a str,
}

impl<'a> RedactedPayload<'a> {
    /// Pairs `payload` with `redactor`.
    pub fn new(redactor: &'a Redactor, payload: &'a str) -> Self {
        Self { redactor, payload }
    }
}

impl SlogValue for RedactedPayload<'_> {
    fn serialize(
        &self,
        _record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        serializer.emit_str(key, &self.redactor.redact_for_log(self.payload))
    }
}

impl SlogRedacted for RedactedPayload<'_> {}

/// Extension trait for ergonomic slog logging of redacted JSON payloads.
///
/// ## Example
/// ```ignore
/// use redactable_json::slog::SlogRedactedExt;
///
/// info!(logger, "request"; "body" => body.slog_redacted(&redactor));
/// ```
pub trait SlogRedactedExt {
    /// Wraps the payload so it is redacted when the record is serialized.
    fn slog_redacted<'a>(&'a self, redactor: &'a Redactor) -> RedactedPayload<'a>;
}

impl<T> SlogRedactedExt for T
where
    T: AsRef<str> + ?Sized,
{
    fn slog_redacted<'a>(&'a self, redactor: &'a Redactor) -> RedactedPayload<'a> {
        RedactedPayload::new(redactor, self.as_ref())
    }
}
