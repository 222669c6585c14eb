//! Resolving attachment file names to document URLs.
//!
//! File-link enrichment asks a [`FileLookup`] collaborator for the URL of
//! the file named in an entry's `L1` field. The collaborator is always an
//! explicit value handed to the rules or the
//! [`Transformer`](crate::Transformer); there is no global connection.
//!
//! [`ManifestLookup`] answers from a saved listing of a document drive,
//! either the JSON body of a drive `files.list` response or a two-column
//! `name,id` CSV file. Names are matched exactly, the way a `name='…'`
//! query would match them, and ids are turned into URLs with a template.
//!
//! # Examples
//!
//! ```
//! use ris_enrich::lookup::{FileLookup, ManifestLookup, Resolution};
//!
//! let csv = "name,id\nAnselin_2001_vogelnieuws2.pdf,1AbC\n";
//! let lookup = ManifestLookup::from_csv(csv.as_bytes())?;
//!
//! assert_eq!(
//!     lookup.resolve("Anselin_2001_vogelnieuws2.pdf")?,
//!     Resolution::SingleMatch("https://drive.google.com/open?id=1AbC".to_string())
//! );
//! assert_eq!(lookup.resolve("missing.pdf")?, Resolution::NotFound);
//! # Ok::<(), ris_enrich::RisError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Result, RisError};

/// Default URL template; `{id}` is replaced by the file id.
pub const DEFAULT_URL_TEMPLATE: &str = "https://drive.google.com/open?id={id}";

/// Outcome of resolving one file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No file with that name.
    NotFound,
    /// Exactly one file; its URL.
    SingleMatch(String),
    /// Several files share the name; their URLs in listing order.
    MultipleMatches(Vec<String>),
}

impl Resolution {
    /// Build a resolution from a list of candidate URLs.
    #[must_use]
    pub fn from_candidates(mut urls: Vec<String>) -> Self {
        match urls.len() {
            0 => Resolution::NotFound,
            1 => Resolution::SingleMatch(urls.remove(0)),
            _ => Resolution::MultipleMatches(urls),
        }
    }
}

/// A file-name → URL resolver.
///
/// Implementations return `Err` only when they cannot answer at all
/// (network, authentication, incomplete search); such an error aborts a
/// transform run. Ambiguity is a normal answer, not an error.
pub trait FileLookup {
    /// Resolve `file_name` to a URL.
    ///
    /// # Errors
    ///
    /// Returns [`RisError::LookupUnavailable`] if the lookup cannot be
    /// performed.
    fn resolve(&self, file_name: &str) -> Result<Resolution>;
}

impl<T: FileLookup + ?Sized> FileLookup for &T {
    fn resolve(&self, file_name: &str) -> Result<Resolution> {
        (**self).resolve(file_name)
    }
}

impl<T: FileLookup + ?Sized> FileLookup for Box<T> {
    fn resolve(&self, file_name: &str) -> Result<Resolution> {
        (**self).resolve(file_name)
    }
}

/// A lookup that never finds anything.
///
/// Useful when file-link enrichment is disabled but a collaborator value is
/// still required.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl FileLookup for NoLookup {
    fn resolve(&self, _file_name: &str) -> Result<Resolution> {
        Ok(Resolution::NotFound)
    }
}

/// Drive `files.list` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveListing {
    #[serde(default)]
    incomplete_search: bool,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

/// Lookup backed by an in-memory listing of a document drive.
#[derive(Debug, Clone)]
pub struct ManifestLookup {
    files: IndexMap<String, Vec<String>>,
    url_template: String,
}

impl ManifestLookup {
    /// Empty manifest using [`DEFAULT_URL_TEMPLATE`].
    #[must_use]
    pub fn new() -> Self {
        ManifestLookup {
            files: IndexMap::new(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    /// Replace the URL template. `{id}` is substituted with the file id; a
    /// template without the placeholder gets the id appended.
    #[must_use]
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Add one file.
    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        self.files.entry(name.into()).or_default().push(id.into());
    }

    /// Load a drive `files.list` JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`RisError::InvalidManifest`] if the JSON does not parse and
    /// [`RisError::LookupUnavailable`] if the listing reports an incomplete
    /// search, since absent names could not be trusted as not found.
    pub fn from_json_listing<R: Read>(reader: R) -> Result<Self> {
        let listing: DriveListing = serde_json::from_reader(reader)
            .map_err(|e| RisError::InvalidManifest(format!("drive listing: {e}")))?;
        if listing.incomplete_search {
            return Err(RisError::LookupUnavailable(
                "drive listing reports an incomplete search".to_string(),
            ));
        }

        let mut lookup = ManifestLookup::new();
        for file in listing.files {
            lookup.insert(file.name, file.id);
        }
        Ok(lookup)
    }

    /// Load a `name,id` CSV manifest with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`RisError::InvalidManifest`] if a row cannot be parsed.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut lookup = ManifestLookup::new();
        for (row, record) in csv_reader.deserialize::<DriveFile>().enumerate() {
            let file = record
                .map_err(|e| RisError::InvalidManifest(format!("csv row {}: {e}", row + 1)))?;
            lookup.insert(file.name, file.id);
        }
        Ok(lookup)
    }

    /// Open a manifest file, JSON if the extension is `.json`, CSV otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let lookup = if is_json {
            Self::from_json_listing(reader)?
        } else {
            Self::from_csv(reader)?
        };
        tracing::info!(
            path = %path.display(),
            files = lookup.len(),
            "loaded lookup manifest"
        );
        Ok(lookup)
    }

    /// Number of distinct file names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the manifest is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// URL for a file id.
    #[must_use]
    pub fn url_for(&self, id: &str) -> String {
        if self.url_template.contains("{id}") {
            self.url_template.replace("{id}", id)
        } else {
            format!("{}{id}", self.url_template)
        }
    }

    /// File names containing `fragment`, in listing order.
    #[must_use]
    pub fn names_containing(&self, fragment: &str) -> Vec<&str> {
        self.files
            .keys()
            .filter(|name| name.contains(fragment))
            .map(String::as_str)
            .collect()
    }
}

impl Default for ManifestLookup {
    fn default() -> Self {
        ManifestLookup::new()
    }
}

impl FileLookup for ManifestLookup {
    fn resolve(&self, file_name: &str) -> Result<Resolution> {
        let urls = self
            .files
            .get(file_name)
            .map(|ids| ids.iter().map(|id| self.url_for(id)).collect())
            .unwrap_or_default();
        Ok(Resolution::from_candidates(urls))
    }
}
