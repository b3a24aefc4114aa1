//! Error handling for css-export
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`CssExportError`]) for anything the plugin core
//!    can fail on, so callers and tests can match on precise variants
//! 2. **User-friendly messages** ([`ErrorContext`]) with suggestions for CLI users
//!
//! # Failure Policy
//!
//! A bundling pass is fail-fast for errors that affect the emitted output and
//! fail-soft for metadata-only problems:
//! - [`CssExportError::InlineFailed`] aborts the whole pass. Its message names the
//!   resolved output name of the offending style sheet.
//! - A style dependency whose final file name cannot be resolved is **not** an
//!   error. It is dropped from the metadata list and logged at `debug`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use css_export::core::{CssExportError, user_friendly_error};
//!
//! let error = CssExportError::InlineFailed {
//!     name: "red.css".to_string(),
//!     reason: "@import target 'missing.css' not found".to_string(),
//! };
//! assert_eq!(
//!     error.to_string(),
//!     "Something went wrong when inlining an @import directive in 'red.css'."
//! );
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored output on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for css-export operations.
///
/// Variants carry owned strings rather than borrowed data so that errors can
/// cross the async boundary of concurrent inlining and be cloned into an
/// [`ErrorContext`].
#[derive(Error, Debug)]
pub enum CssExportError {
    /// The inlining engine failed on a captured style sheet.
    ///
    /// `name` is the resolved output name, not the raw module identifier.
    #[error("Something went wrong when inlining an @import directive in '{name}'.")]
    InlineFailed {
        /// Resolved output name of the style sheet
        name: String,
        /// Engine-side failure description
        reason: String,
    },

    /// An include or exclude glob could not be compiled.
    #[error("Invalid style filter pattern: {pattern}")]
    InvalidPattern {
        /// The offending pattern as configured
        pattern: String,
        /// Compiler message from the glob crate
        reason: String,
    },

    /// The working directory needed for preserve-modules naming is unavailable.
    #[error("Cannot determine the working directory: {reason}")]
    WorkingDirectory {
        /// Underlying I/O failure
        reason: String,
    },

    /// Configuration file or option problem.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// A module graph snapshot could not be used.
    #[error("Invalid module graph: {message}")]
    GraphError {
        /// Description of the problem
        message: String,
    },

    /// TOML parsing error from [`toml::de::Error`]
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON error from [`serde_json::Error`]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Anything else
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for CssExportError {
    fn clone(&self) -> Self {
        match self {
            Self::InlineFailed {
                name,
                reason,
            } => Self::InlineFailed {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::InvalidPattern {
                pattern,
                reason,
            } => Self::InvalidPattern {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Self::WorkingDirectory {
                reason,
            } => Self::WorkingDirectory {
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::GraphError {
                message,
            } => Self::GraphError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying a suggestion and extra details for terminal display.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: CssExportError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Additional explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wraps an error with no suggestion or details.
    #[must_use]
    pub const fn new(error: CssExportError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Adds a suggestion.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Adds details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Prints the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Converts any error into an [`ErrorContext`] suitable for the CLI.
///
/// The error chain is walked so that a [`CssExportError`] wrapped in
/// `anyhow` context is still recognised. Unknown errors keep their full cause
/// chain in the message.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for (depth, cause) in error.chain().enumerate() {
        if let Some(css_error) = cause.downcast_ref::<CssExportError>() {
            let ctx = create_error_context(css_error);
            // keep the outer context (usually the file involved) visible
            if depth > 0 && ctx.details.is_none() {
                return ctx.with_details(error.to_string());
            }
            return ctx;
        }
    }

    let not_found = error
        .downcast_ref::<std::io::Error>()
        .is_some_and(|io_error| io_error.kind() == std::io::ErrorKind::NotFound);
    if not_found {
        return ErrorContext::new(CssExportError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check that the file or directory exists and the path is correct");
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(CssExportError::Other {
        message,
    })
}

fn create_error_context(error: &CssExportError) -> ErrorContext {
    match error {
        CssExportError::InlineFailed {
            reason, ..
        } => ErrorContext::new(error.clone())
            .with_suggestion(
                "Check that every @import target exists relative to the style sheet and is readable",
            )
            .with_details(reason.clone()),

        CssExportError::InvalidPattern {
            reason, ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Use glob syntax: '*' within a directory, '**' across directories")
            .with_details(reason.clone()),

        CssExportError::WorkingDirectory {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Pass --preserve-modules-root with an explicit directory"),

        CssExportError::ConfigError {
            ..
        }
        | CssExportError::TomlError(_) => ErrorContext::new(error.clone()).with_suggestion(
            "Check the syntax of css-export.toml: include, exclude, meta-key and an [output] table",
        ),

        CssExportError::GraphError {
            ..
        }
        | CssExportError::JsonError(_) => ErrorContext::new(error.clone()).with_suggestion(
            "The graph file must look like {\"modules\": [{\"id\": \"...\", \"imports\": [...]}]}",
        ),

        _ => ErrorContext::new(error.clone()),
    }
}
