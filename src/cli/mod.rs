//! Command-line interface for css-export.
//!
//! The binary drives the plugin the way a bundler would, from a JSON snapshot
//! of a module graph (see [`graph`]):
//!
//! - `build` - capture style sheets, emit them as assets, attach style metadata
//! - `deps` - print the style sheets each module transitively depends on
//!
//! # Global Options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - no logging
//! - `--config` - path to a `css-export.toml` (defaults to `./css-export.toml`
//!   when present)
//!
//! Logs go to stderr; stdout carries only JSON output. `RUST_LOG` takes
//! precedence over `--verbose`/`--quiet`.
//!
//! # Example
//!
//! ```bash
//! css-export --verbose build --graph graph.json --out-dir dist --meta-key
//! css-export deps --graph graph.json --exclude '**/vendor/**'
//! ```

mod build;
mod deps;
pub mod graph;

pub use build::BuildCommand;
pub use deps::DepsCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use crate::config::{ConfigFile, parse_config};

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "css-export.toml";

/// Main CLI application structure for css-export.
#[derive(Parser, Debug)]
#[command(
    name = "css-export",
    about = "Export style sheets from a module graph as standalone assets",
    version,
    long_about = "css-export captures style-sheet modules, emits them as assets and records, \
                  for every module, the style files it transitively depends on."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging; only errors are reported.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a configuration file.
    ///
    /// Without it, `css-export.toml` in the working directory is used when
    /// present. Command-line flags override values from the file.
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a bundling pass over a module-graph snapshot
    Build(BuildCommand),

    /// Print transitive style dependencies of each module
    Deps(DepsCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error, for rendering with
    /// [`user_friendly_error`](crate::core::user_friendly_error).
    pub async fn execute(self) -> Result<()> {
        init_logging(self.log_level());

        let config = self.config.as_deref();
        match self.command {
            Commands::Build(cmd) => cmd.execute(config).await,
            Commands::Deps(cmd) => cmd.execute(config),
        }
    }

    /// Log level implied by the verbosity flags. `None` disables logging.
    #[must_use]
    pub fn log_level(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            None
        } else {
            Some("info")
        }
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `level`.
fn init_logging(level: Option<&str>) {
    let filter = match (std::env::var("RUST_LOG"), level) {
        (Ok(_), _) => EnvFilter::from_default_env(),
        (Err(_), Some(level)) => EnvFilter::new(format!("css_export={level}")),
        (Err(_), None) => return,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Loads the configuration file at `path`, or `css-export.toml` from the
/// working directory if it exists, or defaults.
pub(crate) fn load_config(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(path) => parse_config(path),
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.is_file() {
                tracing::debug!("Using {}", CONFIG_FILE_NAME);
                parse_config(default)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}
