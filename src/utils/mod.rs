//! Supporting utilities.
//!
//! - [`platform`] - separator normalization and lexical path arithmetic used by
//!   output naming

pub mod platform;
