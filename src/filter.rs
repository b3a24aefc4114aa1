//! Include/exclude selection of style-sheet modules.
//!
//! A [`StyleFilter`] decides whether a module identifier is a style sheet. The
//! same predicate is used twice during a pass: the capture stage uses it to
//! intercept modules, and the traversal uses it to tell style leaves apart from
//! intermediate modules.
//!
//! # Pattern Syntax
//!
//! Patterns are compiled with the `glob` crate and matched with literal
//! separators:
//!
//! - `*` matches any sequence of characters within a single path component
//! - `**` matches any sequence of path components
//! - `?` matches any single character
//! - `[abc]` / `[a-z]` match a character set or range
//!
//! # Selection Rules
//!
//! 1. Identifiers containing a NUL byte are virtual modules and never selected
//! 2. Backslashes are normalized to `/` before matching
//! 3. An identifier must match at least one include pattern (an empty include
//!    list matches everything)
//! 4. It must match no exclude pattern
//!
//! # Examples
//!
//! ```rust
//! use css_export::filter::StyleFilter;
//!
//! # fn example() -> Result<(), css_export::core::CssExportError> {
//! let filter = StyleFilter::new(&["**/*.css"], &["**/vendor/**"])?;
//!
//! assert!(filter.is_style("/project/src/red.css"));
//! assert!(!filter.is_style("/project/src/red.js"));
//! assert!(!filter.is_style("/project/vendor/normalize.css"));
//! # Ok(())
//! # }
//! ```

use glob::{MatchOptions, Pattern};
use tracing::trace;

use crate::config::PluginOptions;
use crate::core::CssExportError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled include/exclude predicate over module identifiers.
///
/// `StyleFilter` is cheap to clone and holds no interior state, so a single
/// instance can be shared across the capture stage and every traversal.
#[derive(Debug, Clone)]
pub struct StyleFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl StyleFilter {
    /// Compiles include and exclude patterns.
    ///
    /// # Errors
    ///
    /// Returns [`CssExportError::InvalidPattern`] for the first pattern that is
    /// not valid glob syntax.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, CssExportError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Builds the filter described by plugin options, applying the default
    /// include pattern when none is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CssExportError::InvalidPattern`] if any pattern fails to compile.
    pub fn from_options(options: &PluginOptions) -> Result<Self, CssExportError> {
        Self::new(&options.include_patterns(), &options.exclude)
    }

    /// Returns `true` if `id` is selected as a style sheet.
    pub fn is_style(&self, id: &str) -> bool {
        if id.contains('\0') {
            return false;
        }

        let normalized = id.replace('\\', "/");

        let included = self.include.is_empty()
            || self.include.iter().any(|p| p.matches_with(&normalized, MATCH_OPTIONS));
        if !included {
            return false;
        }

        let excluded = self.exclude.iter().any(|p| p.matches_with(&normalized, MATCH_OPTIONS));
        trace!("Filter check for '{}': included, excluded={}", normalized, excluded);
        !excluded
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>, CssExportError> {
    patterns
        .iter()
        .map(|p| {
            let p = p.as_ref();
            Pattern::new(p).map_err(|e| CssExportError::InvalidPattern {
                pattern: p.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}
