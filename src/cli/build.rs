//! Run a bundling pass over a module-graph snapshot.
//!
//! `build` plays the bundler's part: every module of the snapshot goes through
//! the capture stage in file order, the generate stage then emits the captured
//! style sheets and attaches style metadata, and only when the whole pass
//! succeeded are the assets written below `--out-dir`.
//!
//! # Examples
//!
//! ```bash
//! # Flat output, metadata under the default key printed to stdout
//! css-export build --graph graph.json --out-dir dist --meta-key
//!
//! # Keep the source layout below test/, inline @imports with postcss
//! css-export build --graph graph.json --out-dir dist \
//!     --preserve-modules --preserve-modules-root test \
//!     --inline-cmd postcss --inline-arg=--use --inline-arg=postcss-import \
//!     --inline-arg=--from --inline-arg={from}
//! ```
//!
//! # Metadata Output
//!
//! With a metadata key, the metadata of every annotated module is written as
//! a JSON object keyed by module id:
//!
//! ```json
//! { "/project/red.js": ["assets/reset.css", "assets/red.css"] }
//! ```

use anyhow::{Context, Result};
use clap::Args;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::graph::{load_graph, populate};
use super::load_config;
use crate::config::{ConfigFile, DEFAULT_META_KEY, OutputOptions, PluginOptions};
use crate::host::InMemoryBundle;
use crate::inline::CommandInliner;
use crate::plugin::CssExport;

/// Run the plugin over a module graph and write its assets.
#[derive(Args, Debug, Default)]
pub struct BuildCommand {
    /// Module-graph snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    graph: PathBuf,

    /// Directory assets are written to
    #[arg(long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Keep the source directory layout in asset names
    #[arg(long)]
    preserve_modules: bool,

    /// Root the layout is preserved from (defaults to the working directory)
    #[arg(long, value_name = "DIR")]
    preserve_modules_root: Option<PathBuf>,

    /// Asset file-name template (`[name]`, `[extname]`, `[ext]`, `[hash]`)
    #[arg(long, value_name = "TEMPLATE")]
    asset_file_names: Option<String>,

    /// Glob selecting style sheets (repeatable, default `**/*.css`)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Glob removed from the selection (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Attach style metadata under KEY (`styles` when no key is given)
    #[arg(long, value_name = "KEY", num_args = 0..=1, default_missing_value = DEFAULT_META_KEY)]
    meta_key: Option<String>,

    /// Write metadata JSON to FILE instead of stdout
    #[arg(long, value_name = "FILE")]
    meta_out: Option<PathBuf>,

    /// Program used to inline @import directives (reads stdin, writes stdout)
    #[arg(long, value_name = "PROGRAM")]
    inline_cmd: Option<String>,

    /// Argument for the inlining program (repeatable, `{from}` is replaced
    /// with the style sheet id)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, requires = "inline_cmd")]
    inline_arg: Vec<String>,
}

impl BuildCommand {
    /// Execute the build.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the graph cannot be loaded, the
    /// pass fails, or output cannot be written. Nothing is written on failure.
    pub async fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let (options, output) = self.merge(config);

        let mut plugin = CssExport::new(options)?;
        if let Some(program) = &self.inline_cmd {
            let inliner = CommandInliner::new(program.clone()).args(self.inline_arg.iter().cloned());
            plugin = plugin.with_inliner(Arc::new(inliner));
        }

        let modules = load_graph(&self.graph)?;
        let mut host = InMemoryBundle::new(output.asset_file_names.clone());
        let mut pass = plugin.begin_pass();
        populate(&modules, &mut host, |source, id| pass.transform(source, id));

        pass.generate_bundle(&output, &mut host).await?;

        let written = host.write_to(&self.out_dir)?;
        info!("Wrote {} assets to {}", written.len(), self.out_dir.display());

        if let Some(key) = plugin.meta_key() {
            let metadata = collect_metadata(&host, key);
            let json = serde_json::to_string_pretty(&metadata)?;
            match &self.meta_out {
                Some(path) => std::fs::write(path, format!("{json}\n"))
                    .with_context(|| format!("Failed to write metadata: {}", path.display()))?,
                None => println!("{json}"),
            }
        }

        Ok(())
    }

    /// Applies command-line flags on top of file configuration.
    pub(crate) fn merge(&self, config: ConfigFile) -> (PluginOptions, OutputOptions) {
        let ConfigFile {
            plugin: mut options,
            mut output,
        } = config;

        if !self.include.is_empty() {
            options.include = Some(self.include.clone());
        }
        if !self.exclude.is_empty() {
            options.exclude.clone_from(&self.exclude);
        }
        if self.meta_key.is_some() {
            options.meta_key.clone_from(&self.meta_key);
        }

        output.preserve_modules |= self.preserve_modules;
        if self.preserve_modules_root.is_some() {
            output.preserve_modules_root.clone_from(&self.preserve_modules_root);
        }
        if let Some(template) = &self.asset_file_names {
            output.asset_file_names.clone_from(template);
        }

        (options, output)
    }
}

/// Metadata written under `key`, by module id.
fn collect_metadata(host: &InMemoryBundle, key: &str) -> BTreeMap<String, Vec<String>> {
    host.modules()
        .iter()
        .filter_map(|module| module.meta.get(key).map(|files| (module.id.clone(), files.clone())))
        .collect()
}
