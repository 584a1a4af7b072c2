//! The streaming redaction filter.
//!
//! [`RedactionFilter`] sits between a producer and a downstream [`Handler`]. Every
//! event passes through unchanged except the value that answers a matched key,
//! which is replaced by a single `String(substitute)` event.
//!
//! Compound values are handled in skip-subtree mode: the opening event of a matched
//! object or array starts a depth counter, every event inside the subtree is
//! dropped, and the substitute is emitted when the matching close event brings the
//! depth back to zero. Member and element counts of enclosing containers stay
//! accurate because a redacted value is still exactly one value.

use std::ops::ControlFlow;

use crate::{
    config::RedactConfig,
    event::{Event, Handler},
};

// =============================================================================
// RedactionStats - counters for one document
// =============================================================================

/// Counters collected while filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedactionStats {
    /// Matched values replaced by the substitute (scalars and subtrees).
    pub values_redacted: u64,
    /// Matched values that were objects or arrays.
    pub subtrees_redacted: u64,
    /// Events swallowed inside redacted subtrees, including their open and close
    /// events.
    pub events_dropped: u64,
}

// =============================================================================
// FilterState - the only mutable state of the filter
// =============================================================================

/// Mutable state of a [`RedactionFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Set by a matched `Key`, cleared by the next value event.
    pending: bool,
    /// Non-zero while inside a redacted object or array.
    skip_depth: usize,
    stats: RedactionStats,
}

impl FilterState {
    /// Returns `true` if the next value event will be replaced.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns `true` while a redacted subtree is being skipped.
    pub fn is_skipping(&self) -> bool {
        self.skip_depth > 0
    }

    /// Current nesting depth inside the redacted subtree (0 when not skipping).
    pub fn skip_depth(&self) -> usize {
        self.skip_depth
    }

    /// Counters accumulated since the last reset.
    pub fn stats(&self) -> RedactionStats {
        self.stats
    }

    /// Returns `true` if the state is between documents: nothing pending and no
    /// subtree open.
    pub fn is_idle(&self) -> bool {
        !self.pending && self.skip_depth == 0
    }

    /// Clears the state for a new document.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// RedactionFilter
// =============================================================================

/// Pass-through-with-substitution stage between a producer and `downstream`.
///
/// The filter never fails on its own. When `downstream` answers
/// [`ControlFlow::Break`], the filter returns it unchanged so the producer stops.
///
/// A filter instance must not be shared across documents processed concurrently;
/// sequential reuse requires [`RedactionFilter::reset`] between documents.
#[derive(Debug)]
pub struct RedactionFilter<'c, H> {
    config: &'c RedactConfig,
    downstream: H,
    state: FilterState,
}

impl<'c, H: Handler> RedactionFilter<'c, H> {
    /// Binds `downstream` and `config` for the filter's lifetime.
    pub fn new(config: &'c RedactConfig, downstream: H) -> Self {
        Self {
            config,
            downstream,
            state: FilterState::default(),
        }
    }

    /// The configuration this filter applies.
    pub fn config(&self) -> &'c RedactConfig {
        self.config
    }

    /// Current filter state.
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Counters accumulated since construction or the last reset.
    pub fn stats(&self) -> RedactionStats {
        self.state.stats
    }

    /// Clears filter state before the next document.
    ///
    /// The downstream handler is not touched; resetting it is the caller's job.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Shared access to the downstream handler.
    pub fn get_ref(&self) -> &H {
        &self.downstream
    }

    /// Exclusive access to the downstream handler.
    pub fn get_mut(&mut self) -> &mut H {
        &mut self.downstream
    }

    /// Releases the downstream handler.
    pub fn into_inner(self) -> H {
        self.downstream
    }

    fn emit_substitute(&mut self) -> ControlFlow<()> {
        self.state.stats.values_redacted += 1;
        self.downstream
            .handle(Event::String(self.config.substitute()))
    }

    fn skip(&mut self, event: &Event<'_>) -> ControlFlow<()> {
        self.state.stats.events_dropped += 1;
        if event.is_container_start() {
            self.state.skip_depth += 1;
        } else if event.is_container_end() {
            self.state.skip_depth -= 1;
            if self.state.skip_depth == 0 {
                return self.emit_substitute();
            }
        }
        ControlFlow::Continue(())
    }
}

impl<H: Handler> Handler for RedactionFilter<'_, H> {
    fn handle(&mut self, event: Event<'_>) -> ControlFlow<()> {
        if self.state.skip_depth > 0 {
            return self.skip(&event);
        }

        match event {
            Event::Key(name) => {
                self.state.pending = self.config.matches(name);
                if self.state.pending {
                    tracing::trace!(key = name, "redacting value");
                }
                self.downstream.handle(event)
            }
            value if value.is_value() && self.state.pending => {
                self.state.pending = false;
                if value.is_container_start() {
                    self.state.stats.subtrees_redacted += 1;
                    self.skip(&value)
                } else {
                    self.emit_substitute()
                }
            }
            _ => self.downstream.handle(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecorder, OwnedEvent, replay};

    fn run(config: &RedactConfig, events: &[OwnedEvent]) -> Vec<OwnedEvent> {
        let mut filter = RedactionFilter::new(config, EventRecorder::new());
        assert_eq!(replay(events, &mut filter), ControlFlow::Continue(()));
        assert!(filter.state().is_idle());
        filter.into_inner().into_events()
    }

    fn key(name: &str) -> OwnedEvent {
        OwnedEvent::Key(name.into())
    }

    fn string(value: &str) -> OwnedEvent {
        OwnedEvent::String(value.into())
    }

    #[test]
    fn replaces_scalar_after_matched_key() {
        let config = RedactConfig::from_keys(["age"]).with_substitute("x");
        let input = [
            OwnedEvent::StartObject,
            key("age"),
            OwnedEvent::UInt(30),
            OwnedEvent::EndObject(1),
        ];
        let output = run(&config, &input);
        assert_eq!(
            output,
            vec![
                OwnedEvent::StartObject,
                key("age"),
                string("x"),
                OwnedEvent::EndObject(1),
            ]
        );
    }

    #[test]
    fn replaces_every_scalar_kind() {
        let config = RedactConfig::from_keys(["k"]).with_substitute("s");
        let scalars = [
            OwnedEvent::Null,
            OwnedEvent::Bool(true),
            OwnedEvent::Int(-1),
            OwnedEvent::UInt(1),
            OwnedEvent::Int64(i64::MIN),
            OwnedEvent::UInt64(u64::MAX),
            OwnedEvent::Double(1.5),
            OwnedEvent::RawNumber("1e400".into()),
            string("v"),
        ];
        for scalar in scalars {
            let input = [
                OwnedEvent::StartObject,
                key("k"),
                scalar.clone(),
                OwnedEvent::EndObject(1),
            ];
            let output = run(&config, &input);
            assert_eq!(output[2], string("s"), "scalar {scalar:?} was not replaced");
        }
    }

    #[test]
    fn elides_matched_object_subtree() {
        let config = RedactConfig::from_keys(["contact"]).with_substitute("ass");
        let input = [
            OwnedEvent::StartObject,
            key("contact"),
            OwnedEvent::StartObject,
            key("first_name"),
            string("Carol"),
            key("tags"),
            OwnedEvent::StartArray,
            string("a"),
            string("b"),
            OwnedEvent::EndArray(2),
            OwnedEvent::EndObject(2),
            OwnedEvent::EndObject(1),
        ];
        let mut filter = RedactionFilter::new(&config, EventRecorder::new());
        assert_eq!(replay(&input, &mut filter), ControlFlow::Continue(()));

        let stats = filter.stats();
        assert_eq!(stats.values_redacted, 1);
        assert_eq!(stats.subtrees_redacted, 1);
        assert_eq!(stats.events_dropped, 9);
        assert_eq!(
            filter.into_inner().into_events(),
            vec![
                OwnedEvent::StartObject,
                key("contact"),
                string("ass"),
                OwnedEvent::EndObject(1),
            ]
        );
    }

    #[test]
    fn elides_empty_array_subtree() {
        let config = RedactConfig::from_keys(["tags"]);
        let input = [
            OwnedEvent::StartObject,
            key("tags"),
            OwnedEvent::StartArray,
            OwnedEvent::EndArray(0),
            key("n"),
            OwnedEvent::Null,
            OwnedEvent::EndObject(2),
        ];
        let output = run(&config, &input);
        assert_eq!(
            output,
            vec![
                OwnedEvent::StartObject,
                key("tags"),
                string(""),
                key("n"),
                OwnedEvent::Null,
                OwnedEvent::EndObject(2),
            ]
        );
    }

    #[test]
    fn ignores_matching_keys_inside_skipped_subtree() {
        let config = RedactConfig::from_keys(["a"]).with_substitute("-");
        let input = [
            OwnedEvent::StartObject,
            key("a"),
            OwnedEvent::StartObject,
            key("a"),
            OwnedEvent::StartObject,
            OwnedEvent::EndObject(0),
            OwnedEvent::EndObject(1),
            key("b"),
            OwnedEvent::UInt(1),
            OwnedEvent::EndObject(2),
        ];
        let output = run(&config, &input);
        assert_eq!(
            output,
            vec![
                OwnedEvent::StartObject,
                key("a"),
                string("-"),
                key("b"),
                OwnedEvent::UInt(1),
                OwnedEvent::EndObject(2),
            ]
        );
    }

    #[test]
    fn pending_clears_after_one_value() {
        let config = RedactConfig::from_keys(["k"]).with_substitute("s");
        let mut filter = RedactionFilter::new(&config, EventRecorder::new());

        let _ = filter.handle(Event::StartArray);
        let _ = filter.handle(Event::StartObject);
        let _ = filter.handle(Event::Key("k"));
        assert!(filter.state().is_pending());
        let _ = filter.handle(Event::Bool(false));
        assert!(!filter.state().is_pending());
        let _ = filter.handle(Event::EndObject(1));
        let _ = filter.handle(Event::Bool(false));
        let _ = filter.handle(Event::EndArray(2));

        let events = filter.into_inner().into_events();
        assert_eq!(events[3], string("s"));
        assert_eq!(events[5], OwnedEvent::Bool(false));
    }

    #[test]
    fn unmatched_key_resets_pending() {
        let config = RedactConfig::from_keys(["k"]);
        let mut filter = RedactionFilter::new(&config, EventRecorder::new());
        let _ = filter.handle(Event::StartObject);
        let _ = filter.handle(Event::Key("other"));
        assert!(!filter.state().is_pending());
    }

    #[test]
    fn empty_key_set_is_identity() {
        let config = RedactConfig::new().with_substitute("never");
        let input = [
            OwnedEvent::StartArray,
            OwnedEvent::StartObject,
            key("k"),
            OwnedEvent::Double(2.5),
            OwnedEvent::EndObject(1),
            OwnedEvent::EndArray(1),
        ];
        assert_eq!(run(&config, &input), input.to_vec());
    }

    #[test]
    fn propagates_downstream_break() {
        let config = RedactConfig::from_keys(["k"]);
        let mut filter = RedactionFilter::new(&config, EventRecorder::rejecting_at(2));
        assert_eq!(filter.handle(Event::StartObject), ControlFlow::Continue(()));
        assert_eq!(filter.handle(Event::Key("k")), ControlFlow::Continue(()));
        // The substitute is the third downstream event and gets rejected.
        assert_eq!(filter.handle(Event::UInt(7)), ControlFlow::Break(()));
    }

    #[test]
    fn break_on_subtree_close_surfaces_from_close_event() {
        let config = RedactConfig::from_keys(["k"]);
        let mut filter = RedactionFilter::new(&config, EventRecorder::rejecting_at(2));
        let _ = filter.handle(Event::StartObject);
        let _ = filter.handle(Event::Key("k"));
        assert_eq!(filter.handle(Event::StartArray), ControlFlow::Continue(()));
        assert_eq!(filter.handle(Event::Null), ControlFlow::Continue(()));
        assert_eq!(filter.handle(Event::EndArray(1)), ControlFlow::Break(()));
    }

    #[test]
    fn reset_clears_mid_document_state() {
        let config = RedactConfig::from_keys(["k"]);
        let mut filter = RedactionFilter::new(&config, EventRecorder::new());
        let _ = filter.handle(Event::StartObject);
        let _ = filter.handle(Event::Key("k"));
        let _ = filter.handle(Event::StartArray);
        let _ = filter.handle(Event::StartObject);
        assert!(filter.state().is_skipping());
        assert_eq!(filter.state().skip_depth(), 2);

        filter.reset();
        assert_eq!(filter.state().skip_depth(), 0);
        assert!(filter.state().is_idle());
        assert_eq!(filter.stats(), RedactionStats::default());
    }
}
