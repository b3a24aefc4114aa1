//! Delegation to an `@import` inlining engine.
//!
//! Inlining nested include directives is not implemented here. The plugin
//! hands each captured style sheet to an [`ImportInliner`] and acts on one of
//! three outcomes:
//!
//! - [`Inlined::Unchanged`] - no includes were processed, the original content
//!   is emitted byte for byte
//! - [`Inlined::Transformed`] - includes were processed, the engine's output is
//!   emitted
//! - `Err(InlineError)` - the whole pass is aborted
//!
//! [`CommandInliner`] delegates to an external program.

pub mod command;

pub use command::CommandInliner;

use async_trait::async_trait;
use thiserror::Error;

/// Result of running the inlining engine on one style sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inlined {
    /// Nothing to inline
    Unchanged,
    /// Content with includes inlined
    Transformed(String),
}

impl Inlined {
    /// The content to emit, given the original `source`.
    pub fn into_content(self, source: &str) -> String {
        match self {
            Self::Unchanged => source.to_string(),
            Self::Transformed(css) => css,
        }
    }
}

/// Failures reported by an inlining engine.
#[derive(Error, Debug)]
pub enum InlineError {
    /// An include target could not be located.
    #[error("@import target '{target}' not found from '{from}'")]
    TargetNotFound {
        /// The include as written
        target: String,
        /// Notional location of the including sheet
        from: String,
    },

    /// The engine process could not be started.
    #[error("Failed to start inlining engine '{program}': {reason}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// Underlying I/O failure
        reason: String,
    },

    /// The engine ran and reported failure.
    #[error("Inlining engine exited with {status}: {stderr}")]
    Failed {
        /// Exit status description
        status: String,
        /// Captured standard error
        stderr: String,
    },

    /// The engine did not finish in time.
    #[error("Inlining engine timed out after {seconds} seconds")]
    Timeout {
        /// Configured timeout
        seconds: u64,
    },

    /// Any other engine failure.
    #[error("{message}")]
    Engine {
        /// Error message
        message: String,
    },
}

/// A black-box `@import` inlining engine: text in, text out, or failure.
///
/// `from` is the style sheet's module identifier. Engines use it to resolve
/// relative includes and to name the sheet in their own diagnostics.
#[async_trait]
pub trait ImportInliner: Send + Sync {
    /// Inlines the include directives in `source`.
    async fn inline(&self, source: &str, from: &str) -> Result<Inlined, InlineError>;
}
