//! The host bundler, as seen from this plugin.
//!
//! The plugin never builds a module graph, names files or writes output on
//! its own. It consumes the host through the [`BundleHost`] trait:
//!
//! | Direction | Call |
//! |---|---|
//! | in  | [`BundleHost::module_ids`], [`BundleHost::imported_ids`] |
//! | in  | [`BundleHost::file_name_for`] (only meaningful after emission) |
//! | out | [`BundleHost::emit_asset`] |
//! | out | [`BundleHost::set_meta`] |
//!
//! [`InMemoryBundle`] is a complete host implementation used by the CLI and
//! the test suite.

pub mod memory;

pub use memory::{EmittedAsset, InMemoryBundle, ModuleRecord};

/// Host bundler operations the plugin depends on.
pub trait BundleHost {
    /// Every module identifier in the graph, in host order.
    fn module_ids(&self) -> Vec<String>;

    /// Ordered direct imports of `id`, or `None` if the host has no record of it.
    fn imported_ids(&self, id: &str) -> Option<Vec<String>>;

    /// Registers `source` as a standalone output asset under the logical `name`.
    ///
    /// Deduplication, hashing and final path assignment are the host's job.
    fn emit_asset(&mut self, name: &str, source: String);

    /// Final file name assigned to the asset emitted under logical `name`.
    fn file_name_for(&self, name: &str) -> Option<String>;

    /// Writes `files` into the metadata bag of module `id` under `key`.
    fn set_meta(&mut self, id: &str, key: &str, files: Vec<String>);
}
