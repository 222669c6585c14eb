//! RIS tag grammar.
//!
//! A tagged line starts with a fixed six-character prefix:
//!
//! ```text
//! TY  - JOUR
//! ^^^^^^
//! |||||+-- one space
//! ||||+--- hyphen
//! ||++---- exactly two spaces
//! ++------ one uppercase letter, then an uppercase letter or digit
//! ```
//!
//! Everything after column 6 is the field content. Any line without that
//! prefix is a continuation of the nearest tagged line above it.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::tag::{self, Tag};
//!
//! assert!(tag::is_tagged_line("UR  - http://example.org\n"));
//! assert!(!tag::is_tagged_line("http://example.org\n"));
//! assert_eq!(tag::tag_of("L1  - a.pdf\n"), Some(Tag::L1));
//! assert_eq!(tag::content_of("T1  - A title  \r\n"), Some("A title"));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::RisError;

/// Width of the `XX  - ` prefix of a tagged line.
pub const PREFIX_LEN: usize = 6;

/// The fixed separator between a tag and its content.
pub const SEPARATOR: &str = "  - ";

/// A two-character RIS field code such as `TY`, `ER` or `L1`.
///
/// Tags are stored as raw ASCII bytes; construction through [`Tag::new`]
/// or [`FromStr`] guarantees the `[A-Z][A-Z0-9]` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 2]);

impl Tag {
    /// Reference type, first line of every entry.
    pub const TY: Tag = Tag(*b"TY");
    /// End of reference, last line of every entry.
    pub const ER: Tag = Tag(*b"ER");
    /// URL, repeatable.
    pub const UR: Tag = Tag(*b"UR");
    /// Secondary title (subtitle).
    pub const ST: Tag = Tag(*b"ST");
    /// File attachment link.
    pub const L1: Tag = Tag(*b"L1");
    /// Keyword, repeatable.
    pub const KW: Tag = Tag(*b"KW");

    /// Build a tag from two bytes, or `None` if they are not `[A-Z][A-Z0-9]`.
    #[must_use]
    pub const fn new(first: u8, second: u8) -> Option<Tag> {
        if first.is_ascii_uppercase() && (second.is_ascii_uppercase() || second.is_ascii_digit()) {
            Some(Tag([first, second]))
        } else {
            None
        }
    }

    /// The tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII by construction.
        std::str::from_utf8(&self.0).unwrap_or("??")
    }

    /// Render a full tagged line (`XX  - content\n`).
    #[must_use]
    pub fn line(&self, content: &str) -> String {
        format!("{}{SEPARATOR}{content}\n", self.as_str())
    }

    /// The `XX  - ` prefix for this tag.
    #[must_use]
    pub fn prefix(&self) -> String {
        format!("{}{SEPARATOR}", self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = RisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.as_bytes() {
            [a, b] => Tag::new(*a, *b),
            _ => None,
        };
        tag.ok_or_else(|| RisError::Config(format!("not a RIS tag: {s:?}")))
    }
}

/// Strip a trailing `\n` or `\r\n` (and nothing else).
#[must_use]
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Whether `line` carries the `XX  - ` prefix.
///
/// Only the line terminator is ignored; leading whitespace disqualifies the
/// line, and the content after the prefix may be anything, including empty.
#[must_use]
pub fn is_tagged_line(line: &str) -> bool {
    let bytes = strip_terminator(line).as_bytes();
    bytes.len() >= PREFIX_LEN
        && Tag::new(bytes[0], bytes[1]).is_some()
        && &bytes[2..PREFIX_LEN] == SEPARATOR.as_bytes()
}

/// The tag of a tagged line, `None` for a continuation line.
#[must_use]
pub fn tag_of(line: &str) -> Option<Tag> {
    if is_tagged_line(line) {
        let bytes = line.as_bytes();
        Tag::new(bytes[0], bytes[1])
    } else {
        None
    }
}

/// The content of a tagged line with trailing whitespace trimmed, `None`
/// for a continuation line.
#[must_use]
pub fn content_of(line: &str) -> Option<&str> {
    if is_tagged_line(line) {
        Some(line[PREFIX_LEN..].trim_end())
    } else {
        None
    }
}

/// Whether `line` closes an entry.
///
/// The boundary check is deliberately looser than the tag grammar: any line
/// whose first two characters are `ER` ends the current entry, so `ER  -`
/// without the trailing space (a common export quirk) still counts.
#[must_use]
pub fn is_end_line(line: &str) -> bool {
    line.starts_with(Tag::ER.as_str())
}
