//! `mdsite build` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsite_config::{CliSettings, Config};
use mdsite_content::{BuildOptions, FileSnapshotStore, SnapshotStore, build_snapshot};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Path to configuration file (default: auto-discover mdsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Output directory for the persisted snapshot (overrides config).
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
}

impl BuildArgs {
    /// Execute the build command.
    ///
    /// Builds a snapshot of the content root and persists it, printing the
    /// document count on success.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the content root cannot be
    /// scanned.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir,
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source_dir = &config.content_resolved.source_dir;
        let cache_dir = self
            .out_dir
            .unwrap_or_else(|| config.cache_resolved.dir.clone());

        output.info(&format!("Building snapshot of {}", source_dir.display()));

        let options = BuildOptions {
            embed_root_relative: config.content_resolved.embed_root_relative,
        };
        let snapshot = build_snapshot(source_dir, options)?;

        std::fs::create_dir_all(&cache_dir)?;
        FileSnapshotStore::new(cache_dir.clone()).store(&snapshot);

        output.success(&format!(
            "Built {} documents into {}",
            snapshot.docs.len(),
            cache_dir.display()
        ));

        Ok(())
    }
}
