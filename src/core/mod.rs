//! Core types for css-export
//!
//! This module holds the error taxonomy shared by every other module:
//! - [`CssExportError`] - enumerated failure modes of the plugin core
//! - [`ErrorContext`] - user-facing wrapper with suggestions and details
//! - [`user_friendly_error`] - turns any `anyhow::Error` into an [`ErrorContext`]

pub mod error;

pub use error::{CssExportError, ErrorContext, user_friendly_error};
