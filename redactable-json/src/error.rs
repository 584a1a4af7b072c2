//! Error type for redaction passes.
//!
//! A pass either completes or stops partway. When it stops, whatever was already
//! written downstream stays written and the cause is returned as a [`RedactError`].

use std::io;

use serde_json::error::Category;
use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactError>;

/// Why a redaction pass stopped before completing.
#[derive(Error, Debug)]
pub enum RedactError {
    /// The input is not a single well-formed JSON value.
    #[error("invalid JSON at {}: {message}", position(.line, .column, .offset))]
    Syntax {
        /// 0-based byte offset of the offending byte, when the input was in memory.
        offset: Option<usize>,
        /// 1-based line.
        line: usize,
        /// Column within the line, as reported by the parser.
        column: usize,
        /// Parser diagnostic without position information.
        message: String,
    },

    /// A handler stopped the stream without an I/O cause.
    #[error("event stream aborted by handler")]
    Aborted,

    /// Reading the input or writing the output failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl RedactError {
    /// Converts a parser error raised while reading `input` in memory.
    ///
    /// Syntax errors get the byte offset of the offending byte. When the input ended
    /// early, that is the end of the input.
    pub(crate) fn located(err: serde_json::Error, input: &[u8]) -> Self {
        let at_eof = err.classify() == Category::Eof;
        match RedactError::from(err) {
            RedactError::Syntax {
                line,
                column,
                message,
                ..
            } => RedactError::Syntax {
                offset: Some(if at_eof {
                    input.len()
                } else {
                    byte_offset(input, line, column)
                }),
                line,
                column,
                message,
            },
            other => other,
        }
    }

    /// Returns the byte offset of a syntax error, if known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            RedactError::Syntax { offset, .. } => *offset,
            _ => None,
        }
    }

    /// Returns `true` if the input was rejected as malformed JSON.
    pub fn is_syntax(&self) -> bool {
        matches!(self, RedactError::Syntax { .. })
    }
}

impl From<serde_json::Error> for RedactError {
    fn from(err: serde_json::Error) -> Self {
        if err.classify() == Category::Io {
            return RedactError::Io(io::Error::from(err));
        }
        let (line, column) = (err.line(), err.column());
        let full = err.to_string();
        let suffix = format!(" at line {line} column {column}");
        let message = full.strip_suffix(&suffix).unwrap_or(&full).to_owned();
        RedactError::Syntax {
            offset: None,
            line,
            column,
            message,
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref, clippy::ref_option)]
fn position(line: &usize, column: &usize, offset: &Option<usize>) -> String {
    match offset {
        Some(offset) => format!("byte {offset}"),
        None => format!("line {line} column {column}"),
    }
}

/// Converts the parser's line/column pair into a 0-based byte offset.
///
/// The parser reports the column of the offending byte 1-based, so the offset is
/// the start of that line plus `column - 1`, clamped to the input length.
fn byte_offset(input: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        input
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b == b'\n')
            .nth(line - 2)
            .map_or(input.len(), |(index, _)| index + 1)
    };
    (line_start + column.saturating_sub(1)).min(input.len())
}
