//! The css-export plugin.
//!
//! [`CssExport`] holds what is fixed for the plugin's lifetime (the style
//! filter, the metadata key and an optional inlining engine). Each bundling
//! pass gets a fresh [`BundlePass`] from [`CssExport::begin_pass`], which owns
//! the table of captured style sheets. The pass is consumed by
//! [`BundlePass::generate_bundle`], so nothing captured in one pass can leak
//! into the next one (watch-mode rebuilds included).
//!
//! # Lifecycle
//!
//! ```text
//! begin_pass()
//!   │
//!   ├── transform(source, id)      once per module, during graph build
//!   │     └── style sheet? record it, compile to ""
//!   │
//!   └── generate_bundle(output, host)   once, after naming is final
//!         ├── inline every captured sheet concurrently (fail-fast)
//!         ├── emit every sheet under its resolved output name
//!         └── meta key set? attach ordered style file names to each module
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use css_export::config::{OutputOptions, PluginOptions};
//! use css_export::host::InMemoryBundle;
//! use css_export::plugin::CssExport;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let plugin = CssExport::new(PluginOptions::new().meta_key("styles"))?;
//! let mut host = InMemoryBundle::new("assets/[name].[ext]");
//! let mut pass = plugin.begin_pass();
//!
//! let code = pass.transform("body { margin: 0 }", "src/reset.css").unwrap_or_default();
//! host.add_module("src/reset.css", Vec::<String>::new(), code);
//! host.add_module("src/main.js", ["src/reset.css"], "console.log('hi')");
//!
//! pass.generate_bundle(&OutputOptions::default(), &mut host).await?;
//! assert_eq!(host.meta("src/main.js", "styles"), Some(["assets/reset.css".to_string()].as_slice()));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, trace};

use crate::config::{OutputOptions, PluginOptions};
use crate::core::CssExportError;
use crate::filter::StyleFilter;
use crate::graph::ImportEdges;
use crate::host::BundleHost;
use crate::inline::ImportInliner;
use crate::naming::NameResolver;

/// A captured style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleAsset {
    /// Module identifier assigned by the host
    pub id: String,
    /// Raw content as seen by the transform hook
    pub source: String,
}

/// Captured style sheets keyed by identifier, in first-capture order.
///
/// Capturing an identifier again replaces its content but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct StyleAssets {
    entries: Vec<StyleAsset>,
    index: HashMap<String, usize>,
}

impl StyleAssets {
    /// Records `source` for `id`, last write wins.
    pub fn insert(&mut self, id: &str, source: &str) {
        match self.index.get(id) {
            Some(&i) => self.entries[i].source = source.to_string(),
            None => {
                self.index.insert(id.to_string(), self.entries.len());
                self.entries.push(StyleAsset {
                    id: id.to_string(),
                    source: source.to_string(),
                });
            }
        }
    }

    /// The captured sheet for `id`.
    pub fn get(&self, id: &str) -> Option<&StyleAsset> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Iterates in first-capture order.
    pub fn iter(&self) -> impl Iterator<Item = &StyleAsset> {
        self.entries.iter()
    }

    /// Number of captured sheets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a finished pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Logical names of emitted assets, in capture order
    pub emitted: Vec<String>,
    /// Number of modules that received style metadata
    pub annotated: usize,
}

/// The plugin: style selection, metadata key and inlining engine.
#[derive(Clone)]
pub struct CssExport {
    filter: StyleFilter,
    meta_key: Option<String>,
    inliner: Option<Arc<dyn ImportInliner>>,
}

impl std::fmt::Debug for CssExport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssExport")
            .field("filter", &self.filter)
            .field("meta_key", &self.meta_key)
            .field("inliner", &self.inliner.is_some())
            .finish()
    }
}

impl CssExport {
    /// Creates the plugin from options, with no inlining engine.
    ///
    /// # Errors
    ///
    /// Returns [`CssExportError::InvalidPattern`] if an include or exclude
    /// pattern does not compile.
    pub fn new(options: PluginOptions) -> Result<Self, CssExportError> {
        let filter = StyleFilter::from_options(&options)?;
        Ok(Self {
            filter,
            meta_key: options.meta_key,
            inliner: None,
        })
    }

    /// Runs every captured sheet through `inliner` before emission.
    #[must_use]
    pub fn with_inliner(mut self, inliner: Arc<dyn ImportInliner>) -> Self {
        self.inliner = Some(inliner);
        self
    }

    /// The style selection predicate.
    pub const fn filter(&self) -> &StyleFilter {
        &self.filter
    }

    /// The metadata key, if attachment is enabled.
    pub fn meta_key(&self) -> Option<&str> {
        self.meta_key.as_deref()
    }

    /// Starts a bundling pass with an empty capture table.
    pub fn begin_pass(&self) -> BundlePass<'_> {
        BundlePass {
            plugin: self,
            assets: StyleAssets::default(),
        }
    }
}

/// State of one bundling pass.
#[derive(Debug)]
pub struct BundlePass<'a> {
    plugin: &'a CssExport,
    assets: StyleAssets,
}

impl BundlePass<'_> {
    /// Transform hook, called by the host once per module.
    ///
    /// Returns `None` for modules that are not style sheets, leaving them to
    /// normal compilation. Style sheets are recorded and compile to an empty
    /// module: they carry no executable code.
    pub fn transform(&mut self, source: &str, id: &str) -> Option<String> {
        if !self.plugin.filter.is_style(id) {
            return None;
        }

        trace!("Captured style sheet '{}' ({} bytes)", id, source.len());
        self.assets.insert(id, source);
        Some(String::new())
    }

    /// Style sheets captured so far.
    pub const fn captured(&self) -> &StyleAssets {
        &self.assets
    }

    /// Generate hook, called by the host once its module graph and output
    /// naming are final. Consumes the pass.
    ///
    /// # Errors
    ///
    /// Returns [`CssExportError::InlineFailed`] if the inlining engine fails on
    /// any sheet (no asset is emitted in that case), or
    /// [`CssExportError::WorkingDirectory`] if preserve-modules naming cannot
    /// determine the working directory.
    pub async fn generate_bundle<H>(
        self,
        output: &OutputOptions,
        host: &mut H,
    ) -> Result<PassSummary, CssExportError>
    where
        H: BundleHost + ?Sized,
    {
        let resolver = NameResolver::new(output)?;
        let mut summary = PassSummary::default();

        let contents = self.inline_all(&resolver).await?;
        for (asset, content) in self.assets.iter().zip(contents) {
            let name = resolver.resolve(&asset.id);
            debug!("Emitting '{}' as '{}'", asset.id, name);
            host.emit_asset(&name, content);
            summary.emitted.push(name);
        }

        let Some(meta_key) = self.plugin.meta_key() else {
            debug!("No metadata key configured, skipping style metadata");
            info!("Emitted {} style assets", summary.emitted.len());
            return Ok(summary);
        };

        let edges = ImportEdges::snapshot(&*host);
        for id in edges.modules() {
            let styles = edges.collect_styles(id, |candidate| self.plugin.filter.is_style(candidate));
            if styles.is_empty() {
                continue;
            }

            let files: Vec<String> = styles
                .iter()
                .filter_map(|style| {
                    let name = resolver.resolve(style);
                    let file_name = host.file_name_for(&name);
                    if file_name.is_none() {
                        debug!("No emitted asset for '{}' (name '{}'), dropping from metadata", style, name);
                    }
                    file_name
                })
                .collect();

            trace!("Module '{}' styles: {:?}", id, files);
            host.set_meta(id, meta_key, files);
            summary.annotated += 1;
        }

        info!(
            "Emitted {} style assets, attached '{}' metadata to {} modules",
            summary.emitted.len(),
            meta_key,
            summary.annotated
        );
        Ok(summary)
    }

    /// Runs the inlining engine over every captured sheet concurrently and
    /// returns the contents to emit, in capture order.
    async fn inline_all(&self, resolver: &NameResolver) -> Result<Vec<String>, CssExportError> {
        let Some(inliner) = self.plugin.inliner.as_deref() else {
            return Ok(self.assets.iter().map(|a| a.source.clone()).collect());
        };

        let jobs = self.assets.iter().map(|asset| async move {
            match inliner.inline(&asset.source, &asset.id).await {
                Ok(result) => Ok(result.into_content(&asset.source)),
                Err(e) => {
                    let name = resolver.resolve(&asset.id);
                    debug!("Inlining failed for '{}': {}", asset.id, e);
                    Err(CssExportError::InlineFailed {
                        name,
                        reason: e.to_string(),
                    })
                }
            }
        });

        try_join_all(jobs).await
    }
}
