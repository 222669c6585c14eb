#![warn(missing_docs)]

//! # ris-enrich: RIS record enrichment
//!
//! A streaming reader, a small set of enrichment rules and a writer for RIS
//! bibliographic records, the line-oriented `TY  - … ER  - ` format
//! exported by reference managers.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ris_enrich::lookup::ManifestLookup;
//! use ris_enrich::Transformer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lookup = ManifestLookup::open("drive_listing.json")?;
//! let summary = Transformer::new(lookup).transform_files("export.ris", "export_updated.ris")?;
//! for message in &summary.diagnostics {
//!     eprintln!("{message}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading entries
//!
//! ```
//! use ris_enrich::{RisReader, Tag};
//! use std::io::Cursor;
//!
//! let data = "TY  - JOUR\nKW  - birds\nKW  - ringing\nER  - \n";
//! let mut reader = RisReader::new(Cursor::new(data));
//! while let Some(entry) = reader.read_entry()? {
//!     assert_eq!(entry.values(Tag::KW), vec!["birds", "ringing"]);
//! }
//! # Ok::<(), ris_enrich::RisError>(())
//! ```
//!
//! ## Modules
//!
//! - [`tag`] — Tag grammar (`XX  - content`)
//! - [`entry`] — One RIS record with its keyword and tag index arrays
//! - [`reader`] — Grouping a line stream into entries
//! - [`rules`] — URL normalization, subtitle backfill, file-link enrichment
//! - [`lookup`] — File-name to URL collaborators
//! - [`writer`] — Writing entries back to text
//! - [`transform`] — Read, enrich and write a whole stream
//! - [`config`] — TOML run configuration
//! - [`recovery`] — Handling of unterminated trailing entries
//! - [`encoding`] — Input character encodings
//! - [`error`] — Error types and result type

pub mod config;
pub mod encoding;
pub mod entry;
pub mod error;
pub mod lookup;
pub mod reader;
pub mod recovery;
pub mod rules;
pub mod tag;
pub mod transform;
pub mod writer;

pub use config::Config;
pub use encoding::InputEncoding;
pub use entry::Entry;
pub use error::{Result, RisError};
pub use lookup::{FileLookup, ManifestLookup, Resolution};
pub use reader::RisReader;
pub use recovery::{RecoveryContext, RecoveryMode};
pub use rules::{handle_all, handle_file_link, handle_st, handle_ur, LinkOutcome, RuleSet};
pub use tag::Tag;
pub use transform::{transform, TransformSummary, Transformer};
pub use writer::RisWriter;
