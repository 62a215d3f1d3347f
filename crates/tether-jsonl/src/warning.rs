//! Non-fatal problems found while reading JSONL data.

use std::fmt;

/// A line that could not be turned into a record.
///
/// Line numbers are 1-based and refer to physical lines in the file,
/// including blank ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The line is not valid JSON, or not the expected shape.
    MalformedJson {
        /// The 1-based line number where the error occurred.
        line_number: usize,
        /// The parser's description of the problem.
        error: String,
    },

    /// The line is not valid UTF-8.
    InvalidUtf8 {
        /// The 1-based line number where the error occurred.
        line_number: usize,
    },
}

impl Warning {
    /// Returns the line number associated with this warning.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::InvalidUtf8 { line_number } => {
                *line_number
            }
        }
    }

    /// Returns a static string identifying the warning kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "line {line_number}: malformed JSON: {error}")
            }
            Self::InvalidUtf8 { line_number } => {
                write!(f, "line {line_number}: invalid UTF-8")
            }
        }
    }
}
