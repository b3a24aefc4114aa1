//! css-export CLI entry point
//!
//! Handles command-line argument parsing, error display, and command execution.
//!
//! - `build` - run a bundling pass over a module-graph snapshot
//! - `deps` - print transitive style dependencies

use anyhow::Result;
use clap::Parser;
use css_export::cli;
use css_export::core::error::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
