//! Common test helpers and utilities shared across test suite.

#![allow(dead_code)]

use ris_enrich::lookup::{FileLookup, Resolution};
use ris_enrich::{Entry, Result, RisError};
use std::cell::RefCell;
use std::path::PathBuf;

/// Path of a fixture under `tests/data`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

/// Contents of a fixture as text.
pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).expect("Could not read fixture")
}

/// Build an entry from `\n`-less line literals, adding the terminators.
pub fn entry(lines: &[&str]) -> Entry {
    Entry::from_lines(lines.iter().map(|line| format!("{line}\n")).collect())
}

/// Lookup stub answering every name with the same resolution and
/// remembering the names it was asked about.
#[derive(Debug)]
pub struct StubLookup {
    answer: std::result::Result<Resolution, String>,
    pub queries: RefCell<Vec<String>>,
}

impl StubLookup {
    pub fn answering(resolution: Resolution) -> Self {
        StubLookup {
            answer: Ok(resolution),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        StubLookup {
            answer: Err(message.to_string()),
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl FileLookup for StubLookup {
    fn resolve(&self, file_name: &str) -> Result<Resolution> {
        self.queries.borrow_mut().push(file_name.to_string());
        self.answer
            .clone()
            .map_err(RisError::LookupUnavailable)
    }
}
