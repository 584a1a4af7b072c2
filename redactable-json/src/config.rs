//! Redaction configuration: which keys to match and what to write instead.
//!
//! A [`RedactConfig`] is fixed for the lifetime of every filter built from it. It is
//! never validated: an empty key set turns the filter into a pass-through and an
//! empty substitute is a legal replacement.
//!
//! # Example
//!
//! ```rust
//! use redactable_json::RedactConfig;
//!
//! let config = RedactConfig::new()
//!     .with_keys(["first_name", "last_name"])
//!     .with_substitute("[REDACTED]");
//!
//! assert!(config.matches("first_name"));
//! assert!(!config.matches("First_Name"));
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Substitute used when none is configured.
pub const DEFAULT_SUBSTITUTE: &str = "";

/// Conventional placeholder for callers that want a visible marker.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

/// Key set and substitute value for a redaction filter.
///
/// Keys match by exact equality on the unescaped member name, wherever the member
/// appears in the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedactConfig {
    /// Member names whose values are replaced.
    keys: BTreeSet<String>,
    /// Replacement written as a JSON string for every matched value.
    substitute: String,
}

impl RedactConfig {
    /// Creates a configuration with no keys and the default (empty) substitute.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration matching the given keys.
    #[must_use]
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().with_keys(keys)
    }

    /// Adds one key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.keys.insert(key.into());
        self
    }

    /// Adds every key from `keys`.
    #[must_use]
    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the substitute value.
    #[must_use]
    pub fn with_substitute(mut self, substitute: impl Into<String>) -> Self {
        self.substitute = substitute.into();
        self
    }

    /// Returns `true` if values under `key` must be replaced.
    #[inline]
    pub fn matches(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// The configured key set.
    pub fn keys(&self) -> &BTreeSet<String> {
        &self.keys
    }

    /// The configured substitute.
    pub fn substitute(&self) -> &str {
        &self.substitute
    }

    /// Returns `true` when no key is configured, in which case filtering is the
    /// identity.
    pub fn is_passthrough(&self) -> bool {
        self.keys.is_empty()
    }
}
