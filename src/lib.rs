//! css-export - export style sheets from a bundler's module graph
//!
//! A bundler plugin that intercepts style-sheet modules, emits each one as a
//! standalone asset (optionally with its `@import` directives inlined), and
//! records on every module the ordered list of style files it transitively
//! depends on, so a server or HTML generator can emit the right `<link>` tags
//! for each entry point.
//!
//! # Architecture Overview
//!
//! A bundling pass has two stages:
//!
//! 1. **Capture** - the host calls [`plugin::BundlePass::transform`] for every
//!    module. Style sheets are recorded and compiled to an empty module.
//! 2. **Generate** - once naming is final the host calls
//!    [`plugin::BundlePass::generate_bundle`], which emits every captured
//!    sheet and, when a metadata key is configured, walks the import graph to
//!    attach style file names to each module.
//!
//! The host side is abstracted by [`host::BundleHost`]; [`host::InMemoryBundle`]
//! is a complete in-memory implementation used by the CLI and tests.
//!
//! # Core Modules
//!
//! - [`plugin`] - the plugin and its per-pass state
//! - [`filter`] - include/exclude style selection
//! - [`naming`] - output names for style assets
//! - [`graph`] - transitive style-dependency traversal
//! - [`inline`] - `@import` inlining engine delegation
//! - [`host`] - bundler host interface and the in-memory host
//! - [`config`] - plugin and output options, `css-export.toml`
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the `css-export` command-line interface
//! - [`utils`] - path helpers
//!
//! # Configuration (css-export.toml)
//!
//! ```toml
//! include = ["**/*.css"]
//! meta-key = "styles"
//!
//! [output]
//! preserve-modules = true
//! preserve-modules-root = "src"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Emit assets to dist/ and print style metadata
//! css-export build --graph graph.json --out-dir dist --meta-key
//!
//! # Inspect transitive style dependencies
//! css-export deps --graph graph.json
//! ```

// Plugin stages
pub mod filter;
pub mod graph;
pub mod naming;
pub mod plugin;

// Collaborators
pub mod host;
pub mod inline;

// Supporting modules
pub mod cli;
pub mod config;
pub mod core;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::config::{OutputOptions, PluginOptions};
pub use crate::core::CssExportError;
pub use host::{BundleHost, InMemoryBundle};
pub use plugin::{BundlePass, CssExport, PassSummary};
