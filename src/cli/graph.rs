//! Module-graph snapshot files.
//!
//! The CLI stands in for a bundler by replaying a graph described in JSON:
//!
//! ```json
//! {
//!   "modules": [
//!     { "id": "src/red.css" },
//!     { "id": "src/red.js", "imports": ["src/red.css"], "source": "export {}" }
//!   ]
//! }
//! ```
//!
//! A module without `source` is read from the file at its `id`. Relative ids
//! (and the files behind them) are resolved against the snapshot's directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::CssExportError;
use crate::graph::ImportEdges;
use crate::host::InMemoryBundle;
use crate::utils::platform::{normalize_path, normalize_path_for_storage};

/// One module of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphModule {
    /// Module identifier
    pub id: String,
    /// Ordered direct imports
    #[serde(default)]
    pub imports: Vec<String>,
    /// Inline source, read from `id` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A whole snapshot, modules in the order the bundler encountered them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphFile {
    /// Modules
    #[serde(default)]
    pub modules: Vec<GraphModule>,
}

/// A module with its identifier made absolute and its source loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Absolute module identifier
    pub id: String,
    /// Absolute identifiers of direct imports
    pub imports: Vec<String>,
    /// Module source
    pub source: String,
}

impl GraphFile {
    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid snapshot or a module id
    /// appears twice.
    pub fn from_json(content: &str) -> Result<Self, CssExportError> {
        let graph: Self = serde_json::from_str(content)?;

        let mut seen = std::collections::HashSet::new();
        for module in &graph.modules {
            if !seen.insert(module.id.as_str()) {
                return Err(CssExportError::GraphError {
                    message: format!("Module '{}' appears more than once", module.id),
                });
            }
        }
        Ok(graph)
    }
}

/// Registers loaded modules with `host`, passing each source through
/// `transform` first. Modules the transform declines keep their source.
pub fn populate<F>(modules: &[LoadedModule], host: &mut InMemoryBundle, mut transform: F)
where
    F: FnMut(&str, &str) -> Option<String>,
{
    for module in modules {
        let code = transform(&module.source, &module.id).unwrap_or_else(|| module.source.clone());
        host.add_module(module.id.clone(), module.imports.iter().cloned(), code);
    }
}

fn absolutize(base: &Path, id: &str) -> String {
    let path = Path::new(id);
    if path.is_absolute() {
        id.to_string()
    } else {
        normalize_path_for_storage(normalize_path(&base.join(path)))
    }
}

fn read_snapshot(path: &Path) -> Result<(GraphFile, PathBuf)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file: {}", path.display()))?;
    let graph = GraphFile::from_json(&content)
        .with_context(|| format!("Failed to parse graph file: {}", path.display()))?;
    tracing::debug!("Loaded {} modules from {}", graph.modules.len(), path.display());
    Ok((graph, graph_base(path)?))
}

/// Reads the snapshot at `path`, resolving ids against its directory and
/// loading missing sources from disk.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or parsed, or a module
/// source file cannot be read.
pub fn load_graph(path: &Path) -> Result<Vec<LoadedModule>> {
    let (graph, base) = read_snapshot(path)?;

    graph
        .modules
        .into_iter()
        .map(|module| {
            let id = absolutize(&base, &module.id);
            let imports = module.imports.iter().map(|i| absolutize(&base, i)).collect();
            let source = match module.source {
                Some(source) => source,
                None => std::fs::read_to_string(&id)
                    .with_context(|| format!("Failed to read module source: {id}"))?,
            };
            Ok(LoadedModule {
                id,
                imports,
                source,
            })
        })
        .collect()
}

/// Reads only the import edges of the snapshot at `path`. No module source
/// is touched.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read or parsed.
pub fn load_edges(path: &Path) -> Result<ImportEdges> {
    let (graph, base) = read_snapshot(path)?;

    let mut edges = ImportEdges::new();
    for module in &graph.modules {
        let imports = module.imports.iter().map(|i| absolutize(&base, i));
        edges.insert(absolutize(&base, &module.id), imports);
    }
    Ok(edges)
}

fn graph_base(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    if parent.is_absolute() {
        return Ok(parent.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    Ok(cwd.join(parent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snapshot_defaults() {
        let graph = GraphFile::from_json(r#"{"modules":[{"id":"a.css"},{"id":"b.js","imports":["a.css"],"source":""}]}"#)
            .unwrap();
        assert_eq!(graph.modules.len(), 2);
        assert!(graph.modules[0].imports.is_empty());
        assert!(graph.modules[0].source.is_none());
        assert_eq!(graph.modules[1].imports, vec!["a.css".to_string()]);
    }

    #[test]
    fn test_duplicate_module_is_rejected() {
        let err = GraphFile::from_json(r#"{"modules":[{"id":"a.css"},{"id":"a.css"}]}"#).unwrap_err();
        assert!(matches!(err, CssExportError::GraphError { .. }));
    }

    #[test]
    fn test_load_resolves_ids_and_reads_sources() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("styles")).unwrap();
        std::fs::write(temp.path().join("styles/red.css"), ".red{}").unwrap();
        std::fs::write(
            temp.path().join("graph.json"),
            r#"{"modules":[{"id":"styles/red.css"},{"id":"red.js","imports":["./styles/red.css"],"source":"x"}]}"#,
        )
        .unwrap();

        let modules = load_graph(&temp.path().join("graph.json")).unwrap();
        let base = normalize_path_for_storage(temp.path());
        assert_eq!(modules[0].id, format!("{base}/styles/red.css"));
        assert_eq!(modules[0].source, ".red{}");
        assert_eq!(modules[1].imports, vec![format!("{base}/styles/red.css")]);
        assert_eq!(modules[1].source, "x");

        let edges = load_edges(&temp.path().join("graph.json")).unwrap();
        assert_eq!(edges.modules(), [modules[0].id.clone(), modules[1].id.clone()]);
        assert_eq!(edges.imports(&modules[1].id), Some(modules[1].imports.as_slice()));
    }

    #[test]
    fn test_missing_source_file_fails_with_context() {
        // load_edges never reads sources, so only load_graph fails here
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("graph.json"), r#"{"modules":[{"id":"gone.css"}]}"#).unwrap();

        assert!(load_edges(&temp.path().join("graph.json")).is_ok());
        let err = load_graph(&temp.path().join("graph.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read module source"));
    }
}
