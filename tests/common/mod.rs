//! Common test utilities for css-export integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Directory holding the red/blue/purple scenario, relative to the crate root.
pub const SCENARIO_DIR: &str = "tests/fixtures/scenario";

/// Where the scenario is copied to inside a test project.
pub const FIXTURES: &str = "test/fixtures";

/// Temporary project with the scenario fixtures copied to `test/fixtures/`.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    project_dir: PathBuf,
}

impl TestProject {
    /// Create a new project containing the scenario fixtures.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        copy_dir(&scenario_path(), &project_dir.join(FIXTURES))?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// Get the project directory path
    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    /// Path below the project directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_dir.join(relative)
    }

    /// Write a file below the project directory
    pub fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.project_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// The css-export binary, running in the project directory
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("css-export").expect("css-export binary is built");
        cmd.current_dir(&self.project_dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
        cmd
    }
}

/// Absolute path of the scenario fixtures in the source tree.
pub fn scenario_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(SCENARIO_DIR)
}

/// Read a scenario fixture, e.g. `lib/reset.css`.
pub fn fixture(relative: &str) -> String {
    let path = scenario_path().join(relative);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Re-keys metadata by module path relative to `test/fixtures/`, so results
/// can be compared regardless of where the project lives.
pub fn relative_metadata(metadata: BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let marker = format!("{FIXTURES}/");
    metadata
        .into_iter()
        .map(|(id, files)| {
            let key = id.rsplit_once(marker.as_str()).map_or(id.clone(), |(_, rest)| rest.to_string());
            (key, files)
        })
        .collect()
}

fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    /// Assert a file does not exist
    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    /// Assert a file has exact content
    pub fn equals(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
        assert_eq!(content, expected, "File {} content mismatch", path.display());
    }
}
