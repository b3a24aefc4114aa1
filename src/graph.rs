//! Transitive style-dependency resolution over a module graph.
//!
//! The host reports, for every module, the ordered list of identifiers it
//! imports directly. [`ImportEdges`] is a read-only snapshot of that report,
//! taken once when metadata generation starts.
//!
//! [`ImportEdges::collect_styles`] computes, for one starting module, the
//! style sheets reachable through non-style intermediate modules:
//!
//! - imports are visited in import order, depth first
//! - a style import is appended to the result (first occurrence wins)
//! - a non-style import is descended into, its styles merged in place
//! - style sheets are leaves: their own imports are never followed
//!
//! The walk keeps an explicit stack of frames instead of recursing, and a
//! visited set per traversal root. Both are invisible on an acyclic graph: a
//! non-style module reached a second time has already contributed all of its
//! styles. On a cyclic edge list the visited set makes the walk terminate,
//! treating a revisit as already resolved.
//!
//! # Example
//!
//! ```rust
//! use css_export::graph::ImportEdges;
//!
//! let mut edges = ImportEdges::new();
//! edges.insert("a.js", ["b.css", "c.js"]);
//! edges.insert("c.js", ["b.css", "d.css"]);
//!
//! let styles = edges.collect_styles("a.js", |id| id.ends_with(".css"));
//! assert_eq!(styles.as_slice(), ["b.css", "d.css"]);
//! ```

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::host::BundleHost;

/// Ordered, duplicate-free set of identifiers.
///
/// Insertion order is preserved; inserting an identifier that is already
/// present is a no-op and does not move it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl StyleSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.order.push(id);
        true
    }

    /// Returns `true` if `id` is in the set.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// The identifiers in insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    /// Consumes the set, returning the identifiers in insertion order.
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

impl Extend<String> for StyleSet {
    fn extend<I: IntoIterator<Item = String>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<'a> IntoIterator for &'a StyleSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

/// Snapshot of the host's import edges: module → ordered direct imports.
///
/// Module order is the order the host reported them in, which is also the
/// order metadata is attached in.
#[derive(Debug, Clone, Default)]
pub struct ImportEdges {
    modules: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl ImportEdges {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of every module the host knows about.
    ///
    /// Modules for which the host has no record are skipped.
    pub fn snapshot<H: BundleHost + ?Sized>(host: &H) -> Self {
        let mut edges = Self::new();
        for id in host.module_ids() {
            if let Some(imports) = host.imported_ids(&id) {
                edges.insert(id, imports);
            }
        }
        trace!("Snapshot of {} modules taken", edges.len());
        edges
    }

    /// Records the direct imports of `id`, replacing any earlier record while
    /// keeping its original position.
    pub fn insert<I, S>(&mut self, id: impl Into<String>, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let imports = imports.into_iter().map(Into::into).collect();
        if self.edges.insert(id.clone(), imports).is_none() {
            self.modules.push(id);
        }
    }

    /// Module identifiers in host order.
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Direct imports of `id`, if the module is known.
    pub fn imports(&self, id: &str) -> Option<&[String]> {
        self.edges.get(id).map(Vec::as_slice)
    }

    /// Number of modules in the snapshot.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if the snapshot holds no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Collects the style sheets transitively reachable from `id`.
    ///
    /// `is_style` decides which identifiers are style sheets; it should be the
    /// same predicate the capture stage selected modules with.
    pub fn collect_styles<F>(&self, id: &str, is_style: F) -> StyleSet
    where
        F: Fn(&str) -> bool,
    {
        let mut styles = StyleSet::new();
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(id);

        // Each frame is a module whose imports are being walked and the index
        // of the next import to look at.
        let mut stack: Vec<(&[String], usize)> = Vec::new();
        if let Some(imports) = self.imports(id) {
            stack.push((imports, 0));
        }

        while let Some(frame) = stack.last_mut() {
            let (imports, next) = *frame;
            let Some(imported) = imports.get(next) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;

            if is_style(imported) {
                styles.insert(imported.as_str());
            } else if visited.insert(imported.as_str()) {
                if let Some(child) = self.imports(imported) {
                    stack.push((child, 0));
                }
            } else {
                trace!("Skipping already resolved module '{}'", imported);
            }
        }

        styles
    }
}
