//! Command-line entry point: enrich a RIS export.
//!
//! ```text
//! ris-enrich export.ris export_updated.ris drive_listing.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ris_enrich::{Config, InputEncoding, RecoveryMode};

/// Enrich a RIS file: split multi-line URLs, add missing subtitle fields and
/// link attached files to their drive URL.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The original RIS file
    input: PathBuf,

    /// Where to write the updated RIS file
    output: PathBuf,

    /// Drive listing used to resolve file names (`files.list` JSON, or a
    /// `name,id` CSV); not read with `--no-link-files`
    lookup: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "RIS_ENRICH_CONFIG")]
    config: Option<PathBuf>,

    /// What to do with an entry cut off by the end of the file
    #[arg(long, value_parser = parse_recovery_mode)]
    recovery_mode: Option<RecoveryMode>,

    /// Input character encoding (WHATWG label)
    #[arg(long)]
    encoding: Option<String>,

    /// Keep URLs on continuation lines as they are
    #[arg(long)]
    no_normalize_urls: bool,

    /// Do not add empty subtitle fields
    #[arg(long)]
    no_backfill_subtitle: bool,

    /// Do not resolve L1 file links
    #[arg(long)]
    no_link_files: bool,
}

fn parse_recovery_mode(value: &str) -> Result<RecoveryMode, String> {
    value.parse().map_err(|e: ris_enrich::RisError| e.to_string())
}

impl Cli {
    /// Configuration file values with command-line overrides applied.
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(mode) = self.recovery_mode {
            config.reader.recovery_mode = mode;
        }
        if let Some(label) = &self.encoding {
            InputEncoding::for_label(label)?;
            config.reader.encoding.clone_from(label);
        }
        config.rules.normalize_urls &= !self.no_normalize_urls;
        config.rules.backfill_subtitle &= !self.no_backfill_subtitle;
        config.rules.link_files &= !self.no_link_files;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ris_enrich=info")))
        .init();

    let config = cli.config()?;
    let lookup = config
        .open_lookup(&cli.lookup)
        .with_context(|| format!("loading lookup manifest {}", cli.lookup.display()))?;

    let summary = config
        .transformer(lookup)?
        .transform_files(&cli.input, &cli.output)
        .with_context(|| format!("processing {}", cli.input.display()))?;

    tracing::info!(
        "processing done, {} entries written to {}",
        summary.entries_written,
        cli.output.display()
    );
    if !summary.diagnostics.is_empty() {
        tracing::warn!("{} diagnostic(s) during the run", summary.diagnostics.len());
    }
    Ok(())
}
