//! Test utilities for css-export.
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration test suite.
//!
//! - [`init_test_logging`] - Once-guarded tracing setup honouring `RUST_LOG`
//! - [`StubInliner`] - an in-memory [`ImportInliner`] that resolves
//!   `@import` lines against a fixed table of files

use std::collections::HashMap;
use std::path::Path;
use std::sync::Once;

use async_trait::async_trait;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::inline::{ImportInliner, InlineError, Inlined};
use crate::utils::platform::{normalize_path, normalize_path_for_storage};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG`. With neither, logging stays off.
///
/// ```bash
/// RUST_LOG=css_export=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// In-memory inlining engine for tests.
///
/// Every line of the form `@import 'x';` or `@import "x";` is replaced by the
/// content registered for `x`, resolved relative to the directory of the
/// including sheet. Nested imports are not followed. A sheet without import
/// lines is reported as [`Inlined::Unchanged`].
#[derive(Debug, Clone, Default)]
pub struct StubInliner {
    files: HashMap<String, String>,
}

impl StubInliner {
    /// Creates a stub with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `content` at `path`.
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        let key = normalize_path_for_storage(normalize_path(path.as_ref()));
        self.files.insert(key, content.into());
        self
    }

    fn resolve(&self, target: &str, from: &str) -> Option<&String> {
        let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
        let key = normalize_path_for_storage(normalize_path(&base.join(target)));
        self.files.get(&key)
    }
}

fn import_target(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("@import")?.trim();
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    rest.strip_prefix(quote)?.strip_suffix(quote)
}

#[async_trait]
impl ImportInliner for StubInliner {
    async fn inline(&self, source: &str, from: &str) -> Result<Inlined, InlineError> {
        let mut processed = 0;
        let mut lines = Vec::new();

        for line in source.lines() {
            match import_target(line) {
                Some(target) => {
                    let content =
                        self.resolve(target, from).ok_or_else(|| InlineError::TargetNotFound {
                            target: target.to_string(),
                            from: from.to_string(),
                        })?;
                    lines.push(content.clone());
                    processed += 1;
                }
                None => lines.push(line.to_string()),
            }
        }

        if processed == 0 {
            Ok(Inlined::Unchanged)
        } else {
            Ok(Inlined::Transformed(lines.join("\n")))
        }
    }
}
