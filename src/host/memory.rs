//! In-memory reference host.
//!
//! [`InMemoryBundle`] keeps the module graph, emitted assets and module
//! metadata of one bundling pass in memory, and only touches the filesystem
//! when [`InMemoryBundle::write_to`] is called after a successful pass.
//!
//! # File Naming
//!
//! Final file names come from the `asset-file-names` template:
//!
//! | Placeholder | Value for logical name `fixtures/red.css` |
//! |---|---|
//! | `[name]` | `fixtures/red` |
//! | `[extname]` | `.css` |
//! | `[ext]` | `css` |
//! | `[hash]` | first 8 hex chars of the SHA-256 of the content |
//!
//! Two assets landing on the same file name with identical content share the
//! file. With different content the later one gets a numeric suffix before
//! its extension (`assets/red2.css`).
//!
//! File names always stay below the output directory. Root, `.` and `..`
//! segments are dropped from the rendered name, so a logical name such as
//! `../../shared/reset.css` is stored as `shared/reset.css`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::BundleHost;
use crate::config::DEFAULT_ASSET_FILE_NAMES;
use crate::utils::platform::normalize_path;

/// A module known to the in-memory host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Module identifier
    pub id: String,
    /// Ordered direct imports
    pub imports: Vec<String>,
    /// Compiled output after plugin transforms
    pub code: String,
    /// Metadata bag
    pub meta: BTreeMap<String, Vec<String>>,
}

/// An asset registered through [`BundleHost::emit_asset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Logical name the plugin emitted it under
    pub name: String,
    /// Final file name assigned by the host
    pub file_name: String,
    /// Content
    pub source: String,
}

/// A [`BundleHost`] holding everything in memory.
#[derive(Debug, Clone)]
pub struct InMemoryBundle {
    asset_file_names: String,
    modules: Vec<ModuleRecord>,
    index: HashMap<String, usize>,
    assets: Vec<EmittedAsset>,
}

impl Default for InMemoryBundle {
    fn default() -> Self {
        Self::new(DEFAULT_ASSET_FILE_NAMES)
    }
}

impl InMemoryBundle {
    /// Creates an empty bundle naming assets with `asset_file_names`.
    pub fn new(asset_file_names: impl Into<String>) -> Self {
        Self {
            asset_file_names: asset_file_names.into(),
            modules: Vec::new(),
            index: HashMap::new(),
            assets: Vec::new(),
        }
    }

    /// Adds a module with its compiled code. Re-adding an identifier replaces
    /// the earlier record in place.
    pub fn add_module<I, S>(&mut self, id: impl Into<String>, imports: I, code: impl Into<String>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = ModuleRecord {
            id: id.into(),
            imports: imports.into_iter().map(Into::into).collect(),
            code: code.into(),
            meta: BTreeMap::new(),
        };
        match self.index.get(&record.id) {
            Some(&i) => self.modules[i] = record,
            None => {
                self.index.insert(record.id.clone(), self.modules.len());
                self.modules.push(record);
            }
        }
    }

    /// The record for `id`.
    pub fn module(&self, id: &str) -> Option<&ModuleRecord> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    /// All module records in insertion order.
    pub fn modules(&self) -> &[ModuleRecord] {
        &self.modules
    }

    /// Metadata written for `id` under `key`.
    pub fn meta(&self, id: &str, key: &str) -> Option<&[String]> {
        self.module(id).and_then(|m| m.meta.get(key)).map(Vec::as_slice)
    }

    /// Every emitted asset, in emission order.
    pub fn assets(&self) -> &[EmittedAsset] {
        &self.assets
    }

    /// The asset stored at `file_name`.
    pub fn asset(&self, file_name: &str) -> Option<&EmittedAsset> {
        self.assets.iter().find(|a| a.file_name == file_name)
    }

    /// Writes every distinct asset file below `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file name would resolve outside `out_dir`, or a
    /// directory or file cannot be written.
    pub fn write_to(&self, out_dir: &Path) -> Result<Vec<std::path::PathBuf>> {
        let root = normalize_path(out_dir);
        let mut written = Vec::new();
        for asset in &self.assets {
            let target = normalize_path(&out_dir.join(&asset.file_name));
            if !target.starts_with(&root) || target == root {
                anyhow::bail!(
                    "Asset '{}' resolves outside the output directory: {}",
                    asset.file_name,
                    target.display()
                );
            }
            if written.contains(&target) {
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            std::fs::write(&target, &asset.source)
                .with_context(|| format!("Failed to write asset: {}", target.display()))?;
            debug!("Wrote {}", target.display());
            written.push(target);
        }
        Ok(written)
    }

    fn render_file_name(&self, name: &str, source: &str) -> String {
        let (stem, extname) = split_extension(name);
        let ext = extname.strip_prefix('.').unwrap_or(extname);
        let hash = content_hash(source);

        let rendered = self
            .asset_file_names
            .replace("[name]", stem)
            .replace("[extname]", extname)
            .replace("[ext]", ext)
            .replace("[hash]", &hash);
        contained_file_name(&rendered)
    }

    fn unique_file_name(&self, candidate: String, source: &str) -> String {
        let taken = |file_name: &str| self.assets.iter().find(|a| a.file_name == file_name);

        match taken(&candidate) {
            None => return candidate,
            Some(existing) if existing.source == source => return candidate,
            Some(_) => {}
        }

        let (stem, extname) = split_extension(&candidate);
        let mut counter = 2;
        loop {
            let next = format!("{stem}{counter}{extname}");
            match taken(&next) {
                None => return next,
                Some(existing) if existing.source == source => return next,
                Some(_) => counter += 1,
            }
        }
    }
}

impl BundleHost for InMemoryBundle {
    fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }

    fn imported_ids(&self, id: &str) -> Option<Vec<String>> {
        self.module(id).map(|m| m.imports.clone())
    }

    fn emit_asset(&mut self, name: &str, source: String) {
        let candidate = self.render_file_name(name, &source);
        let file_name = self.unique_file_name(candidate, &source);
        debug!("Asset '{}' assigned file name '{}'", name, file_name);
        self.assets.push(EmittedAsset {
            name: name.to_string(),
            file_name,
            source,
        });
    }

    fn file_name_for(&self, name: &str) -> Option<String> {
        self.assets.iter().find(|a| a.name == name).map(|a| a.file_name.clone())
    }

    fn set_meta(&mut self, id: &str, key: &str, files: Vec<String>) {
        if let Some(&i) = self.index.get(id) {
            self.modules[i].meta.insert(key.to_string(), files);
        }
    }
}

/// Splits `name` into everything before the extension of its last segment and
/// the extension itself, dot included.
fn split_extension(name: &str) -> (&str, &str) {
    let segment_start = name.rfind('/').map_or(0, |i| i + 1);
    match name[segment_start..].rfind('.') {
        Some(0) | None => (name, ""),
        Some(dot) => name.split_at(segment_start + dot),
    }
}

/// Drops empty, `.`, `..` and drive segments so the name is relative and
/// cannot climb out of the directory it is joined to.
fn contained_file_name(rendered: &str) -> String {
    let segments: Vec<&str> = rendered
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != ".." && !s.ends_with(':'))
        .collect();
    if segments.len() != rendered.split(['/', '\\']).count() {
        debug!("Asset file name '{}' stored as '{}'", rendered, segments.join("/"));
    }
    segments.join("/")
}

fn content_hash(source: &str) -> String {
    let digest = Sha256::digest(source.as_bytes());
    hex::encode(digest)[..8].to_string()
}
