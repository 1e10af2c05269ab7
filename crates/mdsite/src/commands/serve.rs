//! `mdsite serve` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mdsite_config::{CliSettings, Config};
use mdsite_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdsite.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Markdown source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve the first snapshot without revalidating content (overrides config).
    #[arg(long)]
    frozen: bool,

    /// Enable verbose output (show document warnings).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable snapshot persistence (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable snapshot persistence.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        // Resolve flags before moving into CliSettings
        let cache_enabled = self.resolve_cache_enabled();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            source_dir: self.source_dir,
            cache_enabled,
            frozen: self.frozen.then_some(true),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if config.cache_resolved.enabled {
            ensure_cache_dir(&config.cache_resolved.dir)?;
        }

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Source directory: {}",
            config.content_resolved.source_dir.display()
        ));

        if config.cache_resolved.enabled {
            output.info(&format!(
                "Cache directory: {}",
                config.cache_resolved.dir.display()
            ));
        } else {
            output.info("Cache: disabled");
        }

        if config.cache_resolved.frozen {
            output.info("Snapshot: frozen (content changes ignored)");
        }

        let server_config = server_config_from_config(&config, self.verbose);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

/// Ensure the cache directory exists with a `.gitignore`.
fn ensure_cache_dir(cache_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(cache_dir)?;

    let gitignore_path = cache_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by mdsite\n*\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(cache: Option<bool>, no_cache: bool) -> ServeArgs {
        ServeArgs {
            config: None,
            source_dir: None,
            host: None,
            port: None,
            frozen: false,
            verbose: false,
            cache,
            no_cache,
        }
    }

    #[test]
    fn test_cache_flags_default_to_config() {
        assert_eq!(args(None, false).resolve_cache_enabled(), None);
    }

    #[test]
    fn test_no_cache_flag_disables() {
        assert_eq!(args(None, true).resolve_cache_enabled(), Some(false));
    }

    #[test]
    fn test_cache_flag_passes_through() {
        assert_eq!(args(Some(true), false).resolve_cache_enabled(), Some(true));
        assert_eq!(args(Some(false), false).resolve_cache_enabled(), Some(false));
    }

    #[test]
    fn test_ensure_cache_dir_creates_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join(".mdsite").join("cache");

        ensure_cache_dir(&cache_dir).unwrap();
        let gitignore = std::fs::read_to_string(cache_dir.join(".gitignore")).unwrap();
        assert!(gitignore.ends_with("*\n"));

        // Re-running leaves the existing file alone.
        std::fs::write(cache_dir.join(".gitignore"), "custom\n").unwrap();
        ensure_cache_dir(&cache_dir).unwrap();
        let kept = std::fs::read_to_string(cache_dir.join(".gitignore")).unwrap();
        assert_eq!(kept, "custom\n");
    }
}
