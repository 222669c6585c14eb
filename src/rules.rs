//! Enrichment rules applied to each entry.
//!
//! Three rules, each working on indices computed at the moment it runs:
//!
//! 1. [`handle_ur`] turns bare continuation lines after the first `UR` line
//!    into `UR` lines of their own.
//! 2. [`handle_st`] adds an empty `ST` field before the end marker when the
//!    entry has none.
//! 3. [`handle_file_link`] resolves the file named in `L1` and inserts its
//!    URL as a `UR` line right after it.
//!
//! [`handle_all`] runs them in that order. [`RuleSet`] does the same with
//! individual rules switched off.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::rules;
//! use ris_enrich::lookup::NoLookup;
//! use ris_enrich::Entry;
//!
//! let mut entry = Entry::from_lines(
//!     ["TY  - JOUR\n", "UR  - http://a\n", "http://b\n", "ER  - \n"]
//!         .iter()
//!         .map(ToString::to_string)
//!         .collect(),
//! );
//! rules::handle_all(&mut entry, &NoLookup)?;
//!
//! assert_eq!(
//!     entry.lines(),
//!     ["TY  - JOUR\n", "UR  - http://a\n", "UR  - http://b\n", "ST  - \n", "ER  - \n"]
//! );
//! # Ok::<(), ris_enrich::RisError>(())
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::Result;
use crate::lookup::{FileLookup, Resolution};
use crate::tag::{self, Tag};

lazy_static! {
    /// File name with an extension: no `&` before the dot.
    static ref FILE_NAME: Regex =
        Regex::new(r"[^&]*?\.\S*").expect("file name pattern is valid");
}

/// Extract the attachment file name from an `L1` value.
///
/// Only the last path component (after the final `/` or `\`) is
/// considered, so dots in directory names or link hosts are ignored. Within
/// it, the name runs up to the first `&` that precedes a dot and extension.
///
/// ```
/// use ris_enrich::rules::extract_file_name;
///
/// assert_eq!(
///     extract_file_name("/path/to/Smith_2001_report.pdf"),
///     Some("Smith_2001_report.pdf")
/// );
/// assert_eq!(extract_file_name("C:\\docs\\a.pdf"), Some("a.pdf"));
/// assert_eq!(extract_file_name("/home/j.smith/refs/x.pdf"), Some("x.pdf"));
/// assert_eq!(extract_file_name("/no/extension"), None);
/// ```
#[must_use]
pub fn extract_file_name(value: &str) -> Option<&str> {
    let component = value.trim_end().rsplit(['/', '\\']).next()?;
    FILE_NAME
        .find(component)
        .map(|m| m.as_str())
        .filter(|name| !name.starts_with('.') || name.len() > 1)
}

/// Split URLs written as bare continuation lines into separate `UR` lines.
///
/// Starting right after the first `UR` line, every line up to the next
/// tagged line (or the end marker) is prefixed with `UR  - `. Returns the
/// number of lines converted.
pub fn handle_ur(entry: &mut Entry) -> usize {
    let Some(first) = entry.first_index_of(Tag::UR) else {
        return 0;
    };

    let prefix = Tag::UR.prefix();
    let mut converted = 0;
    let mut index = first + 1;
    while let Some(line) = entry.line(index) {
        if tag::is_tagged_line(line) || tag::is_end_line(line) {
            break;
        }
        entry.prefix_line(index, &prefix);
        converted += 1;
        index += 1;
    }
    converted
}

/// Add an empty `ST` line before the end marker when the entry has none.
///
/// Returns whether a line was added. An unterminated entry gets the line
/// appended at the end.
pub fn handle_st(entry: &mut Entry) -> bool {
    if entry.contains(Tag::ST) {
        return false;
    }
    let index = entry.end_index().unwrap_or(entry.len());
    let line = entry.tagged_line(Tag::ST, "");
    entry.insert_line(index, line).is_ok()
}

/// What file-link enrichment did to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The entry has no `L1` line.
    NoFileLink,
    /// The `L1` value has no recognizable file name.
    Unparseable(String),
    /// The lookup does not know the file.
    NotFound(String),
    /// A `UR` line with this URL was inserted after `L1`.
    Linked(String),
    /// Several files share the name; nothing was inserted.
    Ambiguous {
        /// The file name that was looked up.
        file_name: String,
        /// Candidate URLs in lookup order.
        candidates: Vec<String>,
    },
}

/// Insert the URL of the file named in the first `L1` line.
///
/// # Errors
///
/// Returns the lookup's error unchanged; the entry is not modified.
pub fn handle_file_link<L: FileLookup + ?Sized>(entry: &mut Entry, lookup: &L) -> Result<LinkOutcome> {
    let Some(l1_index) = entry.first_index_of(Tag::L1) else {
        return Ok(LinkOutcome::NoFileLink);
    };
    let value = entry
        .line(l1_index)
        .and_then(tag::content_of)
        .unwrap_or_default();
    let Some(file_name) = extract_file_name(value).map(str::to_string) else {
        return Ok(LinkOutcome::Unparseable(value.to_string()));
    };

    let outcome = match lookup.resolve(&file_name)? {
        Resolution::NotFound => LinkOutcome::NotFound(file_name),
        Resolution::SingleMatch(url) => {
            let line = entry.tagged_line(Tag::UR, &url);
            entry.insert_line(l1_index + 1, line)?;
            LinkOutcome::Linked(url)
        },
        Resolution::MultipleMatches(candidates) => LinkOutcome::Ambiguous {
            file_name,
            candidates,
        },
    };
    tracing::debug!(?outcome, "file link");
    Ok(outcome)
}

/// Which rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Split continuation URLs into `UR` lines.
    pub normalize_urls: bool,
    /// Add an empty `ST` field when missing.
    pub backfill_subtitle: bool,
    /// Add a `UR` line for the `L1` attachment.
    pub link_files: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        RuleSet::all()
    }
}

/// What a [`RuleSet`] changed in one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleReport {
    /// Continuation lines turned into `UR` lines.
    pub urls_normalized: usize,
    /// Whether an empty `ST` line was added.
    pub subtitle_added: bool,
    /// File-link outcome; `NoFileLink` when the rule is off.
    pub link: LinkOutcome,
}

impl RuleSet {
    /// Every rule enabled.
    #[must_use]
    pub const fn all() -> Self {
        RuleSet {
            normalize_urls: true,
            backfill_subtitle: true,
            link_files: true,
        }
    }

    /// Apply the enabled rules in their fixed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    pub fn apply<L: FileLookup + ?Sized>(&self, entry: &mut Entry, lookup: &L) -> Result<RuleReport> {
        let urls_normalized = if self.normalize_urls {
            handle_ur(entry)
        } else {
            0
        };
        let subtitle_added = self.backfill_subtitle && handle_st(entry);
        let link = if self.link_files {
            handle_file_link(entry, lookup)?
        } else {
            LinkOutcome::NoFileLink
        };
        Ok(RuleReport {
            urls_normalized,
            subtitle_added,
            link,
        })
    }
}

/// Apply URL normalization, subtitle backfill and file-link enrichment.
///
/// # Errors
///
/// Returns an error if the lookup fails.
pub fn handle_all<L: FileLookup + ?Sized>(entry: &mut Entry, lookup: &L) -> Result<RuleReport> {
    RuleSet::all().apply(entry, lookup)
}
