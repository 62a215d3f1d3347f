//! JSONL reading operations.

use crate::{Result, Warning};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Async reader for JSONL (JSON Lines) data.
///
/// Wraps an async reader in a [`BufReader`] and tracks the physical line
/// number so parse failures can be reported precisely. Blank lines are
/// skipped but still counted.
///
/// # Examples
///
/// ```no_run
/// use tether_jsonl::JsonlReader;
/// use tokio::fs::File;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let file = File::open("dependencies.jsonl").await?;
/// let mut reader = JsonlReader::new(file);
/// while let Some(record) = reader.read_value::<serde_json::Value>().await? {
///     match record {
///         Ok(value) => println!("{value}"),
///         Err(warning) => eprintln!("{warning}"),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct JsonlReader<R> {
    reader: BufReader<R>,
    /// 1-based number of the last line read, 0 before the first read.
    line_number: usize,
}

impl<R: AsyncRead + Unpin> JsonlReader<R> {
    /// Creates a new `JsonlReader` wrapping the given async reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
        }
    }

    /// Returns the number of the last line read (0 before any read).
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next non-blank line and deserializes it.
    ///
    /// Returns `Ok(None)` at end of input. A line that fails to decode is
    /// returned as `Ok(Some(Err(warning)))` so the caller can keep going.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the underlying read fails.
    pub async fn read_value<T: DeserializeOwned>(
        &mut self,
    ) -> Result<Option<std::result::Result<T, Warning>>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = self.reader.read_until(b'\n', &mut buf).await?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                return Ok(Some(Err(Warning::InvalidUtf8 {
                    line_number: self.line_number,
                })));
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed = serde_json::from_str(line).map_err(|e| Warning::MalformedJson {
                line_number: self.line_number,
                error: e.to_string(),
            });
            return Ok(Some(parsed));
        }
    }
}

/// Reads every record of a JSONL file, collecting bad lines as warnings.
///
/// # Errors
///
/// Returns an error only when the file cannot be opened or read. Lines that
/// fail to parse are reported in the returned warning list.
pub async fn read_jsonl_resilient<T, P>(path: P) -> Result<(Vec<T>, Vec<Warning>)>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref()).await?;
    let mut reader = JsonlReader::new(file);

    let mut values = Vec::new();
    let mut warnings = Vec::new();

    while let Some(record) = reader.read_value::<T>().await? {
        match record {
            Ok(value) => values.push(value),
            Err(warning) => {
                tracing::debug!(%warning, "Skipping unreadable JSONL line");
                warnings.push(warning);
            }
        }
    }

    Ok((values, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u32,
    }

    #[tokio::test]
    async fn reads_values_in_order() {
        let mut reader = JsonlReader::new(Cursor::new(b"{\"id\":1}\n{\"id\":2}\n".to_vec()));

        let first: Row = reader.read_value().await.unwrap().unwrap().unwrap();
        let second: Row = reader.read_value().await.unwrap().unwrap().unwrap();

        assert_eq!(first, Row { id: 1 });
        assert_eq!(second, Row { id: 2 });
        assert!(reader.read_value::<Row>().await.unwrap().is_none());
        assert_eq!(reader.line_number(), 2);
    }

    #[tokio::test]
    async fn blank_lines_are_counted_but_skipped() {
        let mut reader = JsonlReader::new(Cursor::new(b"\n   \n{\"id\":3}".to_vec()));

        let row: Row = reader.read_value().await.unwrap().unwrap().unwrap();
        assert_eq!(row, Row { id: 3 });
        assert_eq!(reader.line_number(), 3);
    }

    #[tokio::test]
    async fn malformed_line_becomes_warning() {
        let mut reader = JsonlReader::new(Cursor::new(b"{\"id\":1}\nnot json\n".to_vec()));

        assert!(reader.read_value::<Row>().await.unwrap().unwrap().is_ok());
        let warning = reader.read_value::<Row>().await.unwrap().unwrap().unwrap_err();
        assert!(matches!(warning, Warning::MalformedJson { line_number: 2, .. }));
    }

    #[tokio::test]
    async fn invalid_utf8_becomes_warning() {
        let mut reader = JsonlReader::new(Cursor::new(vec![0xff, 0xfe, b'\n']));

        let warning = reader.read_value::<Row>().await.unwrap().unwrap().unwrap_err();
        assert_eq!(warning, Warning::InvalidUtf8 { line_number: 1 });
    }
}
