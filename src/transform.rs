//! Streaming read → enrich → write over a whole RIS file.
//!
//! [`Transformer`] owns the lookup collaborator and the run settings. For
//! each entry produced by a [`RisReader`] it applies the enabled rules and
//! writes the entry out before reading the next one, so only one entry is
//! held in memory. An entry is written only once every rule has finished
//! with it.
//!
//! Irregularities (ambiguous or missing files, unparseable links, dropped
//! trailing entries) are collected as diagnostics in the returned
//! [`TransformSummary`]. A lookup failure aborts the run; entries written
//! before it stay in the output.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::lookup::ManifestLookup;
//! use ris_enrich::Transformer;
//!
//! let mut lookup = ManifestLookup::new();
//! lookup.insert("Smith_2001_report.pdf", "123");
//!
//! let input = "TY  - RPRT\nL1  - /refs/Smith_2001_report.pdf\nER  - \n";
//! let mut output = Vec::new();
//! let summary = Transformer::new(lookup).transform(input.as_bytes(), &mut output)?;
//!
//! assert_eq!(summary.entries_written, 1);
//! assert_eq!(
//!     String::from_utf8(output).unwrap(),
//!     "TY  - RPRT\n\
//!      L1  - /refs/Smith_2001_report.pdf\n\
//!      UR  - https://drive.google.com/open?id=123\n\
//!      ST  - \n\
//!      ER  - \n"
//! );
//! # Ok::<(), ris_enrich::RisError>(())
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::encoding::InputEncoding;
use crate::error::Result;
use crate::lookup::FileLookup;
use crate::reader::RisReader;
use crate::recovery::{RecoveryContext, RecoveryMode};
use crate::rules::{LinkOutcome, RuleReport, RuleSet};
use crate::writer::RisWriter;

/// Counters and diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformSummary {
    /// Entries read from the input.
    pub entries_read: usize,
    /// Entries written to the output.
    pub entries_written: usize,
    /// Continuation lines turned into `UR` lines.
    pub urls_normalized: usize,
    /// Empty `ST` lines added.
    pub subtitles_added: usize,
    /// `UR` lines added from resolved file links.
    pub files_linked: usize,
    /// File links the lookup did not know.
    pub files_not_found: usize,
    /// File links matching several files.
    pub ambiguous_lookups: usize,
    /// `L1` values without a recognizable file name.
    pub unparseable_links: usize,
    /// Unterminated trailing entries that were dropped.
    pub dropped_entries: usize,
    /// Human-readable diagnostics: rule diagnostics, then reader diagnostics.
    pub diagnostics: Vec<String>,
}

impl TransformSummary {
    fn record(&mut self, entry_number: usize, report: RuleReport, context: &mut RecoveryContext) {
        self.urls_normalized += report.urls_normalized;
        self.subtitles_added += usize::from(report.subtitle_added);

        match report.link {
            LinkOutcome::NoFileLink => {},
            LinkOutcome::Linked(_) => self.files_linked += 1,
            LinkOutcome::NotFound(file_name) => {
                self.files_not_found += 1;
                tracing::info!(entry = entry_number, file = %file_name, "no match found for file");
            },
            LinkOutcome::Unparseable(value) => {
                self.unparseable_links += 1;
                context.add_message(format!(
                    "entry {entry_number}: no file name in L1 value {value:?}"
                ));
            },
            LinkOutcome::Ambiguous {
                file_name,
                candidates,
            } => {
                self.ambiguous_lookups += 1;
                context.add_message(format!(
                    "entry {entry_number}: multiple matches found for file {file_name}: {}",
                    candidates.join(", ")
                ));
            },
        }
    }
}

/// Applies enrichment rules to every entry of a RIS stream.
#[derive(Debug)]
pub struct Transformer<L: FileLookup> {
    lookup: L,
    rules: RuleSet,
    recovery_mode: RecoveryMode,
    encoding: InputEncoding,
}

impl<L: FileLookup> Transformer<L> {
    /// Transformer with every rule enabled, lenient recovery and UTF-8 input.
    pub fn new(lookup: L) -> Self {
        Transformer {
            lookup,
            rules: RuleSet::all(),
            recovery_mode: RecoveryMode::default(),
            encoding: InputEncoding::default(),
        }
    }

    /// Choose which rules run.
    #[must_use]
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Set the policy for an unterminated trailing entry.
    #[must_use]
    pub fn with_recovery_mode(mut self, mode: RecoveryMode) -> Self {
        self.recovery_mode = mode;
        self
    }

    /// Set the input character encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: InputEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enrich every entry of `input` and write it to `output`.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure, on a lookup failure, or on an
    /// unterminated trailing entry in strict mode. Entries written before
    /// the error remain in `output`, flushed.
    pub fn transform<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<TransformSummary> {
        let mut reader = RisReader::new(input)
            .with_recovery_mode(self.recovery_mode)
            .with_encoding(self.encoding);
        let mut writer = RisWriter::new(output);
        let mut context = RecoveryContext::new(self.recovery_mode);
        let mut summary = TransformSummary::default();

        let result = self.run(&mut reader, &mut writer, &mut context, &mut summary);
        let flushed = writer.finish();
        result?;
        flushed?;

        summary.entries_read = reader.entries_read();
        summary.entries_written = writer.entries_written();
        summary.dropped_entries = reader.dropped_entries();
        summary.diagnostics = context.take_messages();
        summary.diagnostics.extend(reader.take_diagnostics());

        tracing::info!(
            entries = summary.entries_written,
            linked = summary.files_linked,
            subtitles = summary.subtitles_added,
            ambiguous = summary.ambiguous_lookups,
            dropped = summary.dropped_entries,
            "transform complete"
        );
        Ok(summary)
    }

    fn run<R: BufRead, W: Write>(
        &self,
        reader: &mut RisReader<R>,
        writer: &mut RisWriter<W>,
        context: &mut RecoveryContext,
        summary: &mut TransformSummary,
    ) -> Result<()> {
        while let Some(mut entry) = reader.read_entry()? {
            let report = self.rules.apply(&mut entry, &self.lookup)?;
            summary.record(reader.entries_read(), report, context);
            writer.write_entry(&entry)?;
        }
        Ok(())
    }

    /// Enrich the RIS file at `input`, writing the result to `output`.
    ///
    /// Both files are closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be opened, or as
    /// [`transform`](Self::transform).
    pub fn transform_files(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<TransformSummary> {
        let (input, output) = (input.as_ref(), output.as_ref());
        tracing::info!(input = %input.display(), output = %output.display(), "processing RIS file");
        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        self.transform(reader, writer)
    }
}

/// Enrich `input` into `output` with every rule and default settings.
///
/// # Errors
///
/// As [`Transformer::transform`].
pub fn transform<R: BufRead, W: Write, L: FileLookup>(
    input: R,
    output: W,
    lookup: L,
) -> Result<TransformSummary> {
    Transformer::new(lookup).transform(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RisError;
    use crate::lookup::{ManifestLookup, NoLookup, Resolution};
    use std::cell::Cell;

    /// Resolves the first `n` calls, then fails.
    struct FailAfter {
        calls: Cell<usize>,
        limit: usize,
    }

    impl FileLookup for FailAfter {
        fn resolve(&self, file_name: &str) -> Result<Resolution> {
            let calls = self.calls.get() + 1;
            self.calls.set(calls);
            if calls > self.limit {
                return Err(RisError::LookupUnavailable("connection reset".to_string()));
            }
            Ok(Resolution::SingleMatch(format!("http://drive/{file_name}")))
        }
    }

    #[test]
    fn test_counts() {
        let input = "TY  - JOUR\nUR  - http://a\nhttp://b\nER  - \n\
                     TY  - BOOK\nST  - Sub\nL1  - x/dup.pdf\nER  - \n\
                     TY  - CHAP\nL1  - no-extension\nER  - \n";
        let mut lookup = ManifestLookup::new();
        lookup.insert("dup.pdf", "1");
        lookup.insert("dup.pdf", "2");

        let mut out = Vec::new();
        let summary = Transformer::new(lookup).transform(input.as_bytes(), &mut out).unwrap();
        assert_eq!(summary.entries_read, 3);
        assert_eq!(summary.entries_written, 3);
        assert_eq!(summary.urls_normalized, 1);
        assert_eq!(summary.subtitles_added, 2);
        assert_eq!(summary.ambiguous_lookups, 1);
        assert_eq!(summary.unparseable_links, 1);
        assert_eq!(summary.diagnostics.len(), 2);
        assert!(summary.diagnostics[0].contains("entry 2: multiple matches found for file dup.pdf"));
    }

    #[test]
    fn test_lookup_failure_keeps_written_entries() {
        let input = "TY  - JOUR\nL1  - a.pdf\nER  - \nTY  - JOUR\nL1  - b.pdf\nER  - \n";
        let lookup = FailAfter {
            calls: Cell::new(0),
            limit: 1,
        };
        let mut out = Vec::new();
        let result = Transformer::new(lookup).transform(input.as_bytes(), &mut out);
        assert!(matches!(result, Err(RisError::LookupUnavailable(_))));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "TY  - JOUR\nL1  - a.pdf\nUR  - http://drive/a.pdf\nST  - \nER  - \n"
        );
    }

    #[test]
    fn test_dropped_entry_reported() {
        let input = "TY  - JOUR\nER  - \nTY  - JOUR\nT1  - cut\n";
        let mut out = Vec::new();
        let summary = transform(input.as_bytes(), &mut out, NoLookup).unwrap();
        assert_eq!(summary.entries_written, 1);
        assert_eq!(summary.dropped_entries, 1);
        assert_eq!(summary.diagnostics.len(), 1);
    }

    #[test]
    fn test_utf16_input_fails_without_output() {
        let mut input = vec![0xFF, 0xFE];
        for unit in "TY  - JOUR\nT1  - A\nER  - \n".encode_utf16() {
            input.extend_from_slice(&unit.to_le_bytes());
        }
        let mut out = Vec::new();
        let result = Transformer::new(NoLookup).transform(input.as_slice(), &mut out);
        assert!(matches!(result, Err(RisError::EncodingError(ref msg)) if msg.contains("UTF-16LE")));
        assert!(out.is_empty());
    }

    #[test]
    fn test_permissive_keeps_partial_entry() {
        let input = "TY  - JOUR\nER  - \nTY  - JOUR\nT1  - cut";
        let mut out = Vec::new();
        let summary = Transformer::new(NoLookup)
            .with_recovery_mode(RecoveryMode::Permissive)
            .transform(input.as_bytes(), &mut out)
            .unwrap();
        assert_eq!(summary.entries_written, 2);
        assert!(String::from_utf8(out)
            .unwrap()
            .ends_with("TY  - JOUR\nT1  - cut\nST  - \n"));
    }
}
