//! Generic TOML configuration parsing with file path context.
//!
//! Read and parse failures are wrapped so the message always names the file:
//!
//! ```text
//! Failed to parse config file: /path/to/css-export.toml
//! Caused by:
//!     invalid type: string "yes", expected a boolean
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::CssExportError;

/// Reads `path` and deserializes it as TOML into `T`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML for `T`.
///
/// # Examples
///
/// ```rust,no_run
/// use css_export::config::{ConfigFile, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: ConfigFile = parse_config(Path::new("css-export.toml"))?;
/// println!("meta key: {:?}", config.plugin.meta_key);
/// # Ok(())
/// # }
/// ```
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .map_err(|e| CssExportError::ConfigError {
            message: format!("cannot read {}: {e}", path.display()),
        })
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .map_err(CssExportError::from)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
