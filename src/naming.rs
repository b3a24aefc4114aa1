//! Output name resolution for captured style sheets.
//!
//! A module identifier maps to a *logical output name*, which the host later
//! maps to a *final file name* (possibly with a hash or directory added). The
//! logical name is the join key between the asset-emission side and the
//! metadata side of a pass, so it must be a pure function of the identifier
//! and the output configuration.
//!
//! [`NameResolver`] fixes the base directory once, when it is built, so that
//! every later [`NameResolver::resolve`] call is pure and can never disagree
//! with an earlier one within the same pass.
//!
//! # Rules
//!
//! - **preserve-modules**: path of the identifier relative to
//!   `preserve-modules-root` (or the working directory), with `/` separators
//! - otherwise: the identifier's final path segment

use std::path::{Path, PathBuf};

use crate::config::OutputOptions;
use crate::core::CssExportError;
use crate::utils::platform::{normalize_path_for_storage, relative_path};

/// Resolves module identifiers to logical output names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolver {
    preserve_modules: bool,
    cwd: PathBuf,
    root: PathBuf,
}

impl NameResolver {
    /// Builds a resolver for `output`, reading the process working directory
    /// when source layout is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CssExportError::WorkingDirectory`] if preserve-modules is set
    /// and the working directory cannot be determined.
    pub fn new(output: &OutputOptions) -> Result<Self, CssExportError> {
        let cwd = if output.preserve_modules {
            std::env::current_dir().map_err(|e| CssExportError::WorkingDirectory {
                reason: e.to_string(),
            })?
        } else {
            PathBuf::new()
        };
        Ok(Self::with_cwd(output, cwd))
    }

    /// Builds a resolver against an explicit working directory.
    #[must_use]
    pub fn with_cwd(output: &OutputOptions, cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let root = output.preserve_modules_root.clone().unwrap_or_else(|| cwd.clone());
        Self {
            preserve_modules: output.preserve_modules,
            cwd,
            root,
        }
    }

    /// Returns the logical output name for `id`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use css_export::config::OutputOptions;
    /// use css_export::naming::NameResolver;
    ///
    /// let flat = NameResolver::with_cwd(&OutputOptions::default(), "/project");
    /// assert_eq!(flat.resolve("/project/test/fixtures/red.css"), "red.css");
    ///
    /// let output = OutputOptions { preserve_modules: true, ..OutputOptions::default() };
    /// let layout = NameResolver::with_cwd(&output, "/project");
    /// assert_eq!(layout.resolve("/project/test/fixtures/red.css"), "test/fixtures/red.css");
    /// ```
    #[must_use]
    pub fn resolve(&self, id: &str) -> String {
        if self.preserve_modules {
            let relative = relative_path(&self.cwd, &self.root, Path::new(id));
            normalize_path_for_storage(relative)
        } else {
            base_name(id)
        }
    }
}

fn base_name(id: &str) -> String {
    Path::new(id)
        .file_name()
        .map_or_else(|| id.to_string(), |name| name.to_string_lossy().into_owned())
}
