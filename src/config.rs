//! Run configuration loaded from TOML.
//!
//! Every section and key is optional; missing values take their defaults.
//!
//! ```toml
//! [reader]
//! recovery_mode = "lenient"   # strict | lenient | permissive
//! encoding = "utf-8"          # any WHATWG label, e.g. "windows-1252"
//!
//! [rules]
//! normalize_urls = true
//! backfill_subtitle = true
//! link_files = true
//!
//! [lookup]
//! url_template = "https://drive.google.com/open?id={id}"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::encoding::InputEncoding;
use crate::error::{Result, RisError};
use crate::lookup::{FileLookup, ManifestLookup, NoLookup, DEFAULT_URL_TEMPLATE};
use crate::recovery::RecoveryMode;
use crate::rules::RuleSet;
use crate::transform::Transformer;

/// Complete run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input handling
    pub reader: ReaderConfig,
    /// Enabled rules
    pub rules: RuleSet,
    /// Lookup settings
    pub lookup: LookupConfig,
}

/// Input handling settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Policy for an unterminated trailing entry
    pub recovery_mode: RecoveryMode,
    /// Input encoding label
    pub encoding: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            recovery_mode: RecoveryMode::default(),
            encoding: "utf-8".to_string(),
        }
    }
}

/// Lookup settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// URL template, `{id}` is replaced by the file id
    pub url_template: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `RisError::Config` if the document is not valid TOML or has
    /// values of the wrong type.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| RisError::Config(e.to_string()))
    }

    /// Load a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RisError::Config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&contents)
            .map_err(|e| RisError::Config(format!("{}: {e}", path.display())))?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// The configured input encoding.
    ///
    /// # Errors
    ///
    /// Returns `RisError::EncodingError` for an unknown label.
    pub fn encoding(&self) -> Result<InputEncoding> {
        InputEncoding::for_label(&self.reader.encoding)
    }

    /// Open the lookup manifest at `path` with the configured URL template.
    ///
    /// When file linking is disabled the manifest is not read at all and
    /// [`NoLookup`] is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be opened or parsed.
    pub fn open_lookup(&self, path: impl AsRef<Path>) -> Result<Box<dyn FileLookup>> {
        if !self.rules.link_files {
            tracing::debug!("file linking disabled, lookup manifest not loaded");
            return Ok(Box::new(NoLookup));
        }
        let lookup = ManifestLookup::open(path)?.with_url_template(self.lookup.url_template.clone());
        Ok(Box::new(lookup))
    }

    /// Build a transformer around `lookup` with these settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoding label is unknown.
    pub fn transformer<L: FileLookup>(&self, lookup: L) -> Result<Transformer<L>> {
        Ok(Transformer::new(lookup)
            .with_rules(self.rules)
            .with_recovery_mode(self.reader.recovery_mode)
            .with_encoding(self.encoding()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.rules, RuleSet::all());
        assert_eq!(config.reader.recovery_mode, RecoveryMode::Lenient);
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [reader]
            recovery_mode = "permissive"

            [rules]
            link_files = false
            "#,
        )
        .unwrap();
        assert_eq!(config.reader.recovery_mode, RecoveryMode::Permissive);
        assert_eq!(config.reader.encoding, "utf-8");
        assert!(!config.rules.link_files);
        assert!(config.rules.normalize_urls);
        assert_eq!(config.lookup.url_template, DEFAULT_URL_TEMPLATE);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_toml("[reader]\nrecovery_mode = \"sloppy\"\n"),
            Err(RisError::Config(_))
        ));
        let config = Config::from_toml("[reader]\nencoding = \"klingon\"\n").unwrap();
        assert!(config.encoding().is_err());
    }

    #[test]
    fn test_open_lookup_skipped_when_linking_disabled() {
        let mut config = Config::default();
        assert!(matches!(
            config.open_lookup("/nonexistent/listing.json"),
            Err(RisError::IoError(_))
        ));

        config.rules.link_files = false;
        let lookup = config.open_lookup("/nonexistent/listing.json").unwrap();
        assert_eq!(
            lookup.resolve("a.pdf").unwrap(),
            crate::lookup::Resolution::NotFound
        );
    }

    #[test]
    fn test_roundtrip_serialize() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), Config::default());
    }
}
