//! A single RIS reference.
//!
//! An [`Entry`] keeps the raw lines of one record exactly as read, line
//! terminators included, so that untouched lines are written back
//! byte-for-byte. Two parallel arrays are derived from the lines and rebuilt
//! whenever a line is inserted or replaced:
//!
//! - **keywords**: the tag of each tagged line, `None` for continuation lines.
//!   Used to find the first occurrence of a tag.
//! - **tag index**: the tag each line belongs to. Continuation lines inherit
//!   the tag of the nearest tagged line above them.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::{Entry, Tag};
//!
//! let mut entry = Entry::from_lines(vec![
//!     "TY  - JOUR\n".to_string(),
//!     "UR  - http://a\n".to_string(),
//!     "http://b\n".to_string(),
//!     "ER  - \n".to_string(),
//! ]);
//!
//! assert_eq!(entry.first_index_of(Tag::UR), Some(1));
//! assert_eq!(entry.keywords()[2], None);
//! assert_eq!(entry.tag_index()[2], Some(Tag::UR));
//!
//! entry.insert_line(3, "ST  - \n").unwrap();
//! assert!(entry.contains(Tag::ST));
//! ```

use std::fmt;

use crate::error::{Result, RisError};
use crate::tag::{self, Tag};

/// One RIS record: `TY` … `ER`, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    lines: Vec<String>,
    keywords: Vec<Option<Tag>>,
    tag_index: Vec<Option<Tag>>,
}

impl Entry {
    /// Build an entry from raw lines.
    ///
    /// Lines should carry their own terminators; the entry does not add any
    /// when it is written out.
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut entry = Entry {
            lines,
            keywords: Vec::new(),
            tag_index: Vec::new(),
        };
        entry.reindex();
        entry
    }

    fn reindex(&mut self) {
        self.keywords = self.lines.iter().map(|line| tag::tag_of(line)).collect();

        let mut current = None;
        self.tag_index = self
            .keywords
            .iter()
            .map(|keyword| {
                if keyword.is_some() {
                    current = *keyword;
                }
                current
            })
            .collect();
    }

    /// The raw lines, terminators included.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Consume the entry and return its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Line at `index`.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the entry has no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Per-line tag for tagged lines, `None` for continuation lines.
    #[must_use]
    pub fn keywords(&self) -> &[Option<Tag>] {
        &self.keywords
    }

    /// Per-line owning tag; continuation lines inherit the tag above them.
    ///
    /// Lines before the first tagged line have no owner.
    #[must_use]
    pub fn tag_index(&self) -> &[Option<Tag>] {
        &self.tag_index
    }

    /// Index of the first line tagged `tag`.
    #[must_use]
    pub fn first_index_of(&self, tag: Tag) -> Option<usize> {
        self.keywords.iter().position(|k| *k == Some(tag))
    }

    /// Whether any line is tagged `tag`.
    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        self.first_index_of(tag).is_some()
    }

    /// Whether the last line closes the entry.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.lines.last().is_some_and(|line| tag::is_end_line(line))
    }

    /// Index of the end marker, when the entry is terminated.
    #[must_use]
    pub fn end_index(&self) -> Option<usize> {
        if self.is_terminated() {
            Some(self.lines.len() - 1)
        } else {
            None
        }
    }

    /// Reference type from the `TY` line, e.g. `JOUR` or `RPRT`.
    #[must_use]
    pub fn reference_type(&self) -> Option<&str> {
        self.first_index_of(Tag::TY)
            .and_then(|i| tag::content_of(&self.lines[i]))
    }

    /// Content of the first line tagged `tag`.
    #[must_use]
    pub fn first_value(&self, tag: Tag) -> Option<&str> {
        self.first_index_of(tag)
            .and_then(|i| tag::content_of(&self.lines[i]))
    }

    /// Contents of every line tagged `tag`, in order.
    ///
    /// Continuation lines are not joined into the values.
    #[must_use]
    pub fn values(&self, tag: Tag) -> Vec<&str> {
        self.lines
            .iter()
            .zip(&self.keywords)
            .filter(|(_, k)| **k == Some(tag))
            .filter_map(|(line, _)| tag::content_of(line))
            .collect()
    }

    /// Insert a line at `index`, shifting the following lines down.
    ///
    /// A terminated entry only accepts indices up to and including the end
    /// marker's, so the end marker stays last.
    ///
    /// # Errors
    ///
    /// Returns [`RisError::InvalidInsert`] if the index is past the end
    /// marker (or past the last line of an unterminated entry).
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        let limit = self.end_index().unwrap_or(self.lines.len());
        if index > limit {
            return Err(RisError::InvalidInsert(format!(
                "index {index} is past the end marker at {limit}"
            )));
        }
        // Only the last line of a stream can lack a terminator.
        let ending = self.line_ending();
        if let Some(previous) = index.checked_sub(1).and_then(|i| self.lines.get_mut(i)) {
            if !previous.ends_with('\n') {
                previous.push_str(ending);
            }
        }
        self.lines.insert(index, text.into());
        self.reindex();
        Ok(())
    }

    /// Prefix the line at `index` with `prefix`, in place.
    ///
    /// Returns `false` if there is no such line.
    pub fn prefix_line(&mut self, index: usize, prefix: &str) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.insert_str(0, prefix);
        self.reindex();
        true
    }

    /// Append a line regardless of the end marker.
    ///
    /// Used by the reader while accumulating; rules go through
    /// [`insert_line`](Self::insert_line).
    pub(crate) fn push_line(&mut self, line: String) {
        let keyword = tag::tag_of(&line);
        let owner = keyword.or_else(|| self.tag_index.last().copied().flatten());
        self.lines.push(line);
        self.keywords.push(keyword);
        self.tag_index.push(owner);
    }

    /// Line terminator used by this entry: `\r\n` when its first line ends
    /// with one, `\n` otherwise.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        match self.lines.first() {
            Some(line) if line.ends_with("\r\n") => "\r\n",
            _ => "\n",
        }
    }

    /// A `tag`ged line with `content`, terminated like the rest of the entry.
    #[must_use]
    pub fn tagged_line(&self, tag: Tag, content: &str) -> String {
        format!("{}{content}{}", tag.prefix(), self.line_ending())
    }

    /// Whether every line is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Entry {
        Entry::from_lines(
            [
                "TY  - RPRT\n",
                "T1  - Vogelnieuws\n",
                "UR  - http://a\n",
                "http://b\n",
                "KW  - birds\n",
                "KW  - monitoring\n",
                "ER  - \n",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        )
    }

    #[test]
    fn test_keywords_and_tag_index() {
        let entry = sample();
        assert_eq!(entry.keywords()[3], None);
        assert_eq!(entry.tag_index()[3], Some(Tag::UR));
        assert_eq!(entry.keywords()[4], Some(Tag::KW));
        assert_eq!(entry.tag_index().len(), entry.len());
    }

    #[test]
    fn test_lookup() {
        let entry = sample();
        assert_eq!(entry.first_index_of(Tag::KW), Some(4));
        assert_eq!(entry.first_index_of(Tag::ST), None);
        assert!(entry.contains(Tag::UR));
        assert!(!entry.contains(Tag::L1));
        assert_eq!(entry.reference_type(), Some("RPRT"));
        assert_eq!(entry.values(Tag::KW), vec!["birds", "monitoring"]);
        assert_eq!(entry.first_value("T1".parse().unwrap()), Some("Vogelnieuws"));
    }

    #[test]
    fn test_insert_before_end_marker() {
        let mut entry = sample();
        let end = entry.end_index().unwrap();
        entry.insert_line(end, "ST  - \n").unwrap();
        assert_eq!(entry.len(), 8);
        assert_eq!(entry.line(6), Some("ST  - \n"));
        assert!(entry.is_terminated());
        assert_eq!(entry.first_index_of(Tag::ST), Some(6));
    }

    #[test]
    fn test_insert_past_end_marker_rejected() {
        let mut entry = sample();
        let len = entry.len();
        assert!(matches!(
            entry.insert_line(len, "ST  - \n"),
            Err(RisError::InvalidInsert(_))
        ));
        assert_eq!(entry.len(), len);
    }

    #[test]
    fn test_prefix_line_reindexes() {
        let mut entry = sample();
        assert!(entry.prefix_line(3, "UR  - "));
        assert_eq!(entry.keywords()[3], Some(Tag::UR));
        assert_eq!(entry.values(Tag::UR), vec!["http://a", "http://b"]);
        assert!(!entry.prefix_line(99, "UR  - "));
    }

    #[test]
    fn test_push_line_matches_reindex() {
        let mut pushed = Entry::default();
        for line in sample().into_lines() {
            pushed.push_line(line);
        }
        assert_eq!(pushed, sample());
    }

    #[test]
    fn test_line_ending_follows_first_line() {
        assert_eq!(sample().tagged_line(Tag::ST, ""), "ST  - \n");
        let crlf = Entry::from_lines(vec!["TY  - JOUR\r\n".to_string(), "ER  - \r\n".to_string()]);
        assert_eq!(crlf.tagged_line(Tag::UR, "http://a"), "UR  - http://a\r\n");
    }

    #[test]
    fn test_display_is_verbatim() {
        let entry = sample();
        assert_eq!(entry.to_string(), entry.lines().concat());
    }
}
