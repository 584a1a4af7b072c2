//! Reusable per-thread redaction state.
//!
//! A [`Session`] owns the filter state and the output buffer for one caller. Between
//! documents it resets both instead of reallocating, so a loop redacting many
//! documents pays for buffer growth once. The output of every document is identical
//! to what a fresh pipeline would produce.

use tracing::debug;

use crate::{
    config::RedactConfig,
    error::{RedactError, Result},
    filter::{RedactionFilter, RedactionStats},
    read,
    write::JsonWriter,
};

/// Owned pipeline state reused across documents.
///
/// Obtain one from [`crate::Redactor::session`]. A session is used by one thread at
/// a time; parallel workloads create one session per thread.
#[derive(Debug)]
pub struct Session<'c> {
    filter: RedactionFilter<'c, JsonWriter<Vec<u8>>>,
    documents: u64,
}

impl<'c> Session<'c> {
    /// Creates a session applying `config`.
    pub fn new(config: &'c RedactConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Creates a session whose output buffer starts with `capacity` bytes.
    pub fn with_capacity(config: &'c RedactConfig, capacity: usize) -> Self {
        Self {
            filter: RedactionFilter::new(config, JsonWriter::new(Vec::with_capacity(capacity))),
            documents: 0,
        }
    }

    /// Redacts one document and returns the compact output.
    ///
    /// The returned slice borrows the session's buffer and is valid until the next
    /// call. On failure the buffer holds the prefix written before the stop.
    pub fn redact(&mut self, input: &str) -> Result<&str> {
        self.reset();
        let outcome = read::parse_str(input, &mut self.filter);
        self.finish(outcome)?;
        // The writer only emits UTF-8: string payloads are `&str` and everything else
        // is ASCII.
        std::str::from_utf8(self.filter.get_ref().get_ref())
            .map_err(|err| RedactError::Io(std::io::Error::other(err)))
    }

    /// Redacts one UTF-8 JSON document given as bytes.
    pub fn redact_slice(&mut self, input: &[u8]) -> Result<&[u8]> {
        self.reset();
        let outcome = read::parse_slice(input, &mut self.filter);
        self.finish(outcome)?;
        Ok(self.filter.get_ref().get_ref())
    }

    /// Clears filter state, writer state and the output buffer, keeping capacity.
    pub fn reset(&mut self) {
        self.filter.reset();
        let writer = self.filter.get_mut();
        writer.reset();
        writer.get_mut().clear();
    }

    /// Counters from the most recent document.
    pub fn stats(&self) -> RedactionStats {
        self.filter.stats()
    }

    /// Number of documents redacted successfully by this session.
    pub fn documents(&self) -> u64 {
        self.documents
    }

    /// Current capacity of the output buffer.
    pub fn capacity(&self) -> usize {
        self.filter.get_ref().get_ref().capacity()
    }

    /// Output written so far for the current document.
    pub fn output(&self) -> &[u8] {
        self.filter.get_ref().get_ref()
    }

    /// The configuration this session applies.
    pub fn config(&self) -> &'c RedactConfig {
        self.filter.config()
    }

    fn finish(&mut self, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.documents += 1;
                let stats = self.filter.stats();
                debug!(
                    values_redacted = stats.values_redacted,
                    subtrees_redacted = stats.subtrees_redacted,
                    events_dropped = stats.events_dropped,
                    bytes = self.output().len(),
                    "redacted document"
                );
                Ok(())
            }
            Err(RedactError::Aborted) => {
                let err = match self.filter.get_mut().take_error() {
                    Some(io) => RedactError::Io(io),
                    None => RedactError::Aborted,
                };
                debug!(error = %err, "redaction aborted");
                Err(err)
            }
            Err(err) => {
                debug!(error = %err, "redaction failed");
                Err(err)
            }
        }
    }
}
