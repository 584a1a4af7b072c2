//! Streaming key-based redaction for JSON documents.
//!
//! A JSON document is read as a stream of [`Event`]s and passed through a
//! [`RedactionFilter`] before it reaches a downstream [`Handler`]. The value of
//! every object member whose key is in the configured key set is replaced by a
//! single substitute string; nested objects and arrays under such a key are
//! dropped as a whole. Everything else passes through unchanged.
//!
//! What this crate does:
//! - defines the event vocabulary and the handler contract
//! - implements the redaction filter with bounded per-document state
//! - provides a producer (`read`) built on `serde_json` and a compact or pretty
//!   writer (`write`)
//! - offers whole-document entrypoints ([`Redactor`]) and reusable per-thread
//!   [`Session`]s
//! - provides logging adapters for `tracing` and, behind a feature flag, `slog`
//!
//! What it does not do:
//! - match keys by path, pattern or case-insensitively
//! - redact array elements or bare values outside an object member
//! - decide which keys are sensitive
//!
//! # Example
//!
//! ```rust
//! use redactable_json::{RedactConfig, Redactor};
//!
//! let redactor = Redactor::new(
//!     RedactConfig::from_keys(["first_name", "address"]).with_substitute("ass"),
//! );
//! let output = redactor.redact_str(
//!     r#"{"first_name":"Alice","address":{"city":"Paris"},"age":30}"#,
//! )?;
//! assert_eq!(output, r#"{"first_name":"ass","address":"ass","age":30}"#);
//! # Ok::<(), redactable_json::RedactError>(())
//! ```

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod config;
mod error;
mod event;
mod filter;
pub mod read;
mod redactor;
mod session;
#[cfg(feature = "slog")]
pub mod slog;
pub mod tracing;
pub mod write;

// Re-exports
pub use config::{DEFAULT_SUBSTITUTE, REDACTED_PLACEHOLDER, RedactConfig};
pub use error::{RedactError, Result};
pub use event::{Event, EventRecorder, Handler, OwnedEvent, replay};
pub use filter::{FilterState, RedactionFilter, RedactionStats};
pub use read::{parse_reader, parse_slice, parse_str};
pub use redactor::Redactor;
pub use session::Session;
#[cfg(feature = "slog")]
pub use slog::{RedactedPayload, SlogRedactedExt};
pub use tracing::TracingRedactedExt;
pub use write::JsonWriter;
