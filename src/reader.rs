//! Reading RIS entries from text streams.
//!
//! This module provides [`RisReader`] for grouping the lines of any
//! [`std::io::BufRead`] source into [`Entry`] values. An entry ends at the
//! first line whose first two characters are `ER`, and that line belongs to
//! the entry. Lines keep their terminators so unchanged lines can be written
//! back unchanged.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::RisReader;
//! use std::io::Cursor;
//!
//! let data = "TY  - JOUR\nT1  - First\nER  - \n\nTY  - BOOK\nER  - \n";
//! let mut reader = RisReader::new(Cursor::new(data));
//!
//! let first = reader.read_entry()?.unwrap();
//! assert_eq!(first.reference_type(), Some("JOUR"));
//!
//! // The blank separator line opens the second entry.
//! let second = reader.read_entry()?.unwrap();
//! assert_eq!(second.len(), 3);
//! assert!(reader.read_entry()?.is_none());
//! # Ok::<(), ris_enrich::RisError>(())
//! ```
//!
//! Iterating:
//!
//! ```
//! use ris_enrich::RisReader;
//! use std::io::Cursor;
//!
//! let data = "TY  - JOUR\nER  - \nTY  - BOOK\nER  - \n";
//! let count = RisReader::new(Cursor::new(data)).entries().count();
//! assert_eq!(count, 2);
//! ```

use std::io::BufRead;

use crate::encoding::InputEncoding;
use crate::entry::Entry;
use crate::error::{Result, RisError};
use crate::recovery::{RecoveryContext, RecoveryMode};
use crate::tag;

/// Streaming reader for RIS text.
///
/// The reader holds at most one entry in memory. It is forward-only: once
/// the source is exhausted, [`read_entry`](Self::read_entry) keeps
/// returning `Ok(None)`.
#[derive(Debug)]
pub struct RisReader<R: BufRead> {
    reader: R,
    encoding: InputEncoding,
    recovery: RecoveryContext,
    buffer: Vec<u8>,
    lines_read: usize,
    entries_read: usize,
    dropped_entries: usize,
    exhausted: bool,
}

impl<R: BufRead> RisReader<R> {
    /// Create a new RIS reader over UTF-8 input in lenient recovery mode.
    pub fn new(reader: R) -> Self {
        RisReader {
            reader,
            encoding: InputEncoding::default(),
            recovery: RecoveryContext::default(),
            buffer: Vec::new(),
            lines_read: 0,
            entries_read: 0,
            dropped_entries: 0,
            exhausted: false,
        }
    }

    /// Set the recovery mode for an unterminated trailing entry.
    ///
    /// - `Strict`: return [`RisError::UnterminatedEntry`]
    /// - `Lenient`: drop the partial entry and record a diagnostic (default)
    /// - `Permissive`: return the partial entry
    ///
    /// # Examples
    ///
    /// ```
    /// use ris_enrich::{RecoveryMode, RisReader};
    /// use std::io::Cursor;
    ///
    /// let mut reader = RisReader::new(Cursor::new("TY  - JOUR\nT1  - cut off\n"))
    ///     .with_recovery_mode(RecoveryMode::Permissive);
    /// let partial = reader.read_entry().unwrap().unwrap();
    /// assert!(!partial.is_terminated());
    /// ```
    #[must_use]
    pub fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery.mode = mode;
        self
    }

    /// Set the input character encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: InputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Read one raw line, decoded, terminator included.
    ///
    /// A byte-order mark on the first line selects the encoding for the rest
    /// of the stream.
    fn next_line(&mut self) -> Result<Option<String>> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(None);
        }

        let mut start = 0;
        if self.lines_read == 0 {
            if let Some((encoding, len)) = InputEncoding::sniff_bom(&self.buffer)? {
                self.encoding = encoding;
                start = len;
            }
        }
        self.lines_read += 1;
        let (text, had_errors) = self.encoding.decode_line(&self.buffer[start..]);
        let text = text.into_owned();
        if had_errors {
            self.recovery.add_message(format!(
                "line {}: invalid {} sequence replaced",
                self.lines_read,
                self.encoding.name()
            ));
        }
        Ok(Some(text))
    }

    /// Read the next entry.
    ///
    /// Returns `Ok(Some(entry))` when an `ER` line closes an entry and
    /// `Ok(None)` at end of input. What happens to lines left over at end
    /// of input depends on the [`RecoveryMode`]; trailing blank lines are
    /// always a clean end.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs, or if the input ends inside
    /// an entry in strict mode.
    pub fn read_entry(&mut self) -> Result<Option<Entry>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut entry = Entry::default();
        while let Some(line) = self.next_line()? {
            let is_end = tag::is_end_line(&line);
            entry.push_line(line);
            if is_end {
                self.entries_read += 1;
                tracing::debug!(
                    entry = self.entries_read,
                    lines = entry.len(),
                    "read entry"
                );
                return Ok(Some(entry));
            }
        }

        self.exhausted = true;
        if entry.is_blank() {
            return Ok(None);
        }
        self.finish_partial(entry)
    }

    fn finish_partial(&mut self, entry: Entry) -> Result<Option<Entry>> {
        if self.recovery.mode == RecoveryMode::Permissive {
            self.entries_read += 1;
            self.recovery.add_message(format!(
                "entry {} has no ER line, kept as read ({} lines)",
                self.entries_read,
                entry.len()
            ));
            return Ok(Some(entry));
        }

        let error = RisError::UnterminatedEntry(format!(
            "{} trailing line(s) after entry {}",
            entry.len(),
            self.entries_read
        ));
        let recovered = self
            .recovery
            .recover::<Entry>(error, "dropped unterminated entry")?;
        self.dropped_entries += 1;
        Ok(recovered)
    }

    /// Iterate over the remaining entries.
    pub fn entries(&mut self) -> Entries<'_, R> {
        Entries { reader: self }
    }

    /// Number of entries returned so far.
    #[must_use]
    pub fn entries_read(&self) -> usize {
        self.entries_read
    }

    /// Number of unterminated trailing entries that were dropped.
    #[must_use]
    pub fn dropped_entries(&self) -> usize {
        self.dropped_entries
    }

    /// Diagnostics recorded while reading.
    #[must_use]
    pub fn diagnostics(&self) -> &[String] {
        &self.recovery.recovery_messages
    }

    /// Move the recorded diagnostics out of the reader.
    pub fn take_diagnostics(&mut self) -> Vec<String> {
        self.recovery.take_messages()
    }
}

/// Iterator over the entries of a [`RisReader`].
///
/// Yields `Err` once on an I/O or strict-mode failure; the reader stays
/// usable but the failing entry is lost.
#[derive(Debug)]
pub struct Entries<'a, R: BufRead> {
    reader: &'a mut RisReader<R>,
}

impl<R: BufRead> Iterator for Entries<'_, R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_entry().transpose()
    }
}
