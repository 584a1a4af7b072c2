//! Adapters for emitting redacted JSON payloads through `tracing`.
//!
//! [`TracingRedactedExt`] turns a raw JSON payload into a display value holding the
//! redacted text, so a payload can be attached to an event without the original
//! values reaching the subscriber.
//!
//! # Example
//!
//! ```rust
//! use redactable_json::{RedactConfig, Redactor, tracing::TracingRedactedExt};
//!
//! let redactor = Redactor::new(RedactConfig::from_keys(["password"]).with_substitute("***"));
//! let body = r#"{"user":"alice","password":"hunter2"}"#;
//!
//! tracing::info!(body = %body.tracing_redacted(&redactor), "login request");
//! ```
//!
//! Redaction failures never fall back to the raw payload: the display value holds a
//! placeholder message instead.

use tracing::field::{DisplayValue, display};

use crate::redactor::Redactor;

/// Marker trait for values whose `tracing` output is always redacted.
///
/// Implemented only for wrappers produced by this module, never for raw payloads.
pub trait TracingRedacted {}

/// Redacted payload ready to be recorded as a `tracing` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedactedPayloadText(String);

impl std::fmt::Display for RedactedPayloadText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TracingRedacted for RedactedPayloadText {}

impl<T: TracingRedacted + std::fmt::Display> TracingRedacted for DisplayValue<T> {}

/// Extension trait for logging JSON payloads through `tracing` in redacted form.
pub trait TracingRedactedExt {
    /// Redacts the payload and wraps it as a `tracing` display value.
    fn tracing_redacted(&self, redactor: &Redactor) -> DisplayValue<RedactedPayloadText>;
}

impl<T> TracingRedactedExt for T
where
    T: AsRef<str> + ?Sized,
{
    fn tracing_redacted(&self, redactor: &Redactor) -> DisplayValue<RedactedPayloadText> {
        display(RedactedPayloadText(redactor.redact_for_log(self.as_ref())))
    }
}
