//! Writing RIS entries to text streams.
//!
//! This module provides [`RisWriter`] for serializing [`Entry`] values to
//! any destination implementing [`std::io::Write`]. Lines are written
//! verbatim, terminators included, so a read-write cycle without rules
//! reproduces the input bytes (UTF-8 input without a byte-order mark).
//!
//! # Examples
//!
//! ```
//! use ris_enrich::{RisReader, RisWriter};
//! use std::io::Cursor;
//!
//! let data = "TY  - JOUR\r\nT1  - Title\r\nER  - \r\n";
//! let mut reader = RisReader::new(Cursor::new(data));
//!
//! let mut buffer = Vec::new();
//! {
//!     let mut writer = RisWriter::new(&mut buffer);
//!     while let Some(entry) = reader.read_entry()? {
//!         writer.write_entry(&entry)?;
//!     }
//!     writer.finish()?;
//! }
//! assert_eq!(buffer, data.as_bytes());
//! # Ok::<(), ris_enrich::RisError>(())
//! ```

use std::io::Write;

use crate::entry::Entry;
use crate::error::{Result, RisError};

/// Writer for RIS text.
#[derive(Debug)]
pub struct RisWriter<W: Write> {
    writer: W,
    entries_written: usize,
    finished: bool,
}

impl<W: Write> RisWriter<W> {
    /// Create a new RIS writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - Any destination implementing [`std::io::Write`]
    pub fn new(writer: W) -> Self {
        RisWriter {
            writer,
            entries_written: 0,
            finished: false,
        }
    }

    /// Write every line of `entry`, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer is finished or an I/O error occurs.
    pub fn write_entry(&mut self, entry: &Entry) -> Result<()> {
        if self.finished {
            return Err(RisError::IoError(std::io::Error::other(
                "cannot write to a finished writer",
            )));
        }

        for line in entry.lines() {
            self.writer.write_all(line.as_bytes())?;
        }
        self.entries_written += 1;
        Ok(())
    }

    /// Flush the writer and mark it as finished.
    ///
    /// After calling `finish`, no more entries can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing the underlying writer fails.
    pub fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    /// Returns the number of entries written so far.
    #[must_use]
    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Consume the writer, returning the underlying destination.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(lines: &[&str]) -> Entry {
        Entry::from_lines(lines.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_write_entries_in_order() {
        let mut writer = RisWriter::new(Vec::new());
        writer
            .write_entry(&entry(&["TY  - JOUR\n", "ER  - \n"]))
            .unwrap();
        writer
            .write_entry(&entry(&["TY  - BOOK\n", "ER  - \n"]))
            .unwrap();
        assert_eq!(writer.entries_written(), 2);
        let out = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(out, "TY  - JOUR\nER  - \nTY  - BOOK\nER  - \n");
    }

    #[test]
    fn test_write_after_finish_fails() {
        let mut writer = RisWriter::new(Vec::new());
        writer.finish().unwrap();
        assert!(writer
            .write_entry(&entry(&["TY  - JOUR\n", "ER  - \n"]))
            .is_err());
        assert_eq!(writer.entries_written(), 0);
    }
}
