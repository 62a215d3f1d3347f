//! JSON Lines persistence helpers for tether.
//!
//! Two operations cover everything the tracker needs from its data files:
//!
//! - [`read_jsonl_resilient`] parses a file record by record, turning bad
//!   lines into [`Warning`]s instead of failing the whole load.
//! - [`write_jsonl_atomic`] writes a full snapshot through a temporary file
//!   and renames it over the target.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod warning;
pub mod writer;

pub use atomic::write_jsonl_atomic;
pub use error::{Error, Result};
pub use reader::{read_jsonl_resilient, JsonlReader};
pub use warning::Warning;
pub use writer::JsonlWriter;
