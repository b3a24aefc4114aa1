//! Show the style sheets each module transitively depends on.
//!
//! Runs only the traversal, with no capture and no emission, and prints one
//! entry per module that reaches at least one style sheet, in snapshot order:
//!
//! ```json
//! [
//!   { "id": "/project/purple.js", "styles": ["/project/lib/reset.css", "/project/red.css", "/project/blue.css"] }
//! ]
//! ```

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::graph::load_edges;
use super::load_config;
use crate::filter::StyleFilter;
use crate::graph::ImportEdges;

/// Print transitive style dependencies of a module graph.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Module-graph snapshot (JSON)
    #[arg(long, value_name = "FILE")]
    graph: PathBuf,

    /// Glob selecting style sheets (repeatable, default `**/*.css`)
    #[arg(long, value_name = "GLOB")]
    include: Vec<String>,

    /// Glob removed from the selection (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct ModuleStyles {
    id: String,
    styles: Vec<String>,
}

impl DepsCommand {
    /// Execute the command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the graph cannot be loaded, or a
    /// pattern is invalid.
    pub fn execute(self, config_path: Option<&Path>) -> Result<()> {
        let mut options = load_config(config_path)?.plugin;
        if !self.include.is_empty() {
            options.include = Some(self.include);
        }
        if !self.exclude.is_empty() {
            options.exclude = self.exclude;
        }

        let filter = StyleFilter::from_options(&options)?;
        let edges = load_edges(&self.graph)?;
        let report = style_report(&edges, &filter);

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

fn style_report(edges: &ImportEdges, filter: &StyleFilter) -> Vec<ModuleStyles> {
    edges
        .modules()
        .iter()
        .filter_map(|id| {
            let styles = edges.collect_styles(id, |candidate| filter.is_style(candidate));
            (!styles.is_empty()).then(|| ModuleStyles {
                id: id.clone(),
                styles: styles.into_vec(),
            })
        })
        .collect()
}
