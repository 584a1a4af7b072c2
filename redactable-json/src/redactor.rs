//! Whole-document entrypoints.
//!
//! [`Redactor`] wires the producer, the filter and the writer together for callers
//! that have a complete document (or a reader and a writer) rather than an event
//! stream. It is immutable and can be shared across threads; per-thread mutable
//! state lives in a [`Session`].

use std::io;

use tracing::debug;

use crate::{
    config::RedactConfig,
    error::{RedactError, Result},
    filter::{RedactionFilter, RedactionStats},
    read,
    session::Session,
    write::JsonWriter,
};

/// Redacts JSON documents according to a [`RedactConfig`].
///
/// # Example
///
/// ```rust
/// use redactable_json::{RedactConfig, Redactor};
///
/// let redactor = Redactor::new(RedactConfig::from_keys(["first_name"]).with_substitute("***"));
/// let output = redactor.redact_str(r#"{"first_name":"Alice","age":30}"#)?;
/// assert_eq!(output, r#"{"first_name":"***","age":30}"#);
/// # Ok::<(), redactable_json::RedactError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Redactor {
    config: RedactConfig,
}

impl Redactor {
    /// Creates a redactor applying `config`.
    pub fn new(config: RedactConfig) -> Self {
        Self { config }
    }

    /// The configuration this redactor applies.
    pub fn config(&self) -> &RedactConfig {
        &self.config
    }

    /// Redacts `input` and returns compact JSON.
    pub fn redact_str(&self, input: &str) -> Result<String> {
        let mut session = Session::with_capacity(&self.config, input.len());
        session.redact(input).map(str::to_owned)
    }

    /// Redacts UTF-8 JSON bytes and returns compact JSON bytes.
    pub fn redact_slice(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut session = Session::with_capacity(&self.config, input.len());
        session.redact_slice(input).map(<[u8]>::to_vec)
    }

    /// Streams a document from `reader` to `writer`, redacting on the way.
    ///
    /// Neither the input nor the output is held in memory. On failure the bytes
    /// already written to `writer` are left in place.
    pub fn redact_reader<R, W>(&self, reader: R, writer: W) -> Result<RedactionStats>
    where
        R: io::Read,
        W: io::Write,
    {
        let mut filter = RedactionFilter::new(&self.config, JsonWriter::new(writer));
        match read::parse_reader(reader, &mut filter) {
            Ok(()) => {
                filter.get_mut().flush()?;
                let stats = filter.stats();
                debug!(
                    values_redacted = stats.values_redacted,
                    events_dropped = stats.events_dropped,
                    "redacted stream"
                );
                Ok(stats)
            }
            Err(RedactError::Aborted) => match filter.get_mut().take_error() {
                Some(err) => Err(RedactError::Io(err)),
                None => Err(RedactError::Aborted),
            },
            Err(err) => {
                debug!(error = %err, "stream redaction failed");
                Err(err)
            }
        }
    }

    /// Redacted text for log output.
    ///
    /// Failures become a placeholder message, never the raw payload.
    pub(crate) fn redact_for_log(&self, payload: &str) -> String {
        self.redact_str(payload)
            .unwrap_or_else(|err| format!("Failed to redact payload: {err}"))
    }

    /// Creates a reusable [`Session`] bound to this redactor's configuration.
    pub fn session(&self) -> Session<'_> {
        Session::new(&self.config)
    }
}

impl From<RedactConfig> for Redactor {
    fn from(config: RedactConfig) -> Self {
        Self::new(config)
    }
}
