//! Configuration for css-export
//!
//! Two option sets flow through a bundling pass:
//!
//! 1. [`PluginOptions`] - fixed when the plugin is constructed: which modules
//!    are style sheets, and under which key (if any) style metadata is attached
//! 2. [`OutputOptions`] - supplied by the host at generation time: whether the
//!    source layout is preserved in output names, the root it is preserved
//!    from, and the asset file-name template the host applies downstream
//!
//! Both can be loaded from a `css-export.toml` file with [`ConfigFile`]:
//!
//! ```toml
//! include = ["**/*.css"]
//! exclude = ["**/vendor/**"]
//! meta-key = "styles"
//!
//! [output]
//! preserve-modules = true
//! preserve-modules-root = "src"
//! asset-file-names = "assets/[name].[ext]"
//! ```
//!
//! # Metadata Default
//!
//! Metadata attachment is opt-in. Without a `meta-key` no module metadata is
//! written at all. [`DEFAULT_META_KEY`] is the key used when a caller asks for
//! metadata without naming a key (the CLI's bare `--meta-key` flag).

pub mod parser;

pub use parser::parse_config;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Include pattern used when none is configured.
pub const DEFAULT_INCLUDE: &str = "**/*.css";

/// Metadata key used when attachment is requested without an explicit key.
pub const DEFAULT_META_KEY: &str = "styles";

/// Asset file-name template used by the in-memory host when none is configured.
pub const DEFAULT_ASSET_FILE_NAMES: &str = "assets/[name]-[hash][extname]";

/// Options the plugin is constructed with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PluginOptions {
    /// Glob patterns selecting style sheets.
    ///
    /// `None` means [`DEFAULT_INCLUDE`]. An explicit empty list selects every
    /// module that is not excluded.
    pub include: Option<Vec<String>>,

    /// Glob patterns removed from the selection.
    pub exclude: Vec<String>,

    /// Key under which style metadata is written. `None` disables attachment.
    pub meta_key: Option<String>,
}

impl PluginOptions {
    /// Creates options with the default include pattern and no metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the include patterns.
    #[must_use]
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the exclude patterns.
    #[must_use]
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Enables metadata attachment under `key`.
    #[must_use]
    pub fn meta_key(mut self, key: impl Into<String>) -> Self {
        self.meta_key = Some(key.into());
        self
    }

    /// Include patterns with the default applied.
    #[must_use]
    pub fn include_patterns(&self) -> Vec<String> {
        self.include.clone().unwrap_or_else(|| vec![DEFAULT_INCLUDE.to_string()])
    }
}

/// The host's output configuration, as far as this plugin reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputOptions {
    /// Keep the source directory layout in output names.
    pub preserve_modules: bool,

    /// Root the layout is preserved from. Defaults to the working directory.
    pub preserve_modules_root: Option<PathBuf>,

    /// Template the host turns logical asset names into file names with.
    pub asset_file_names: String,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            preserve_modules: false,
            preserve_modules_root: None,
            asset_file_names: DEFAULT_ASSET_FILE_NAMES.to_string(),
        }
    }
}

/// Layout of a `css-export.toml` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Plugin options at the top level of the file
    #[serde(flatten)]
    pub plugin: PluginOptions,

    /// The `[output]` table
    pub output: OutputOptions,
}
